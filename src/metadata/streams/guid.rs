//! The `#GUID` heap: 16-byte GUIDs addressed by 1-based index.

use crate::Result;

/// The `#GUID` heap (ECMA-335 II.24.2.5).
///
/// Unlike the other heaps it is indexed by entry number, starting at 1; 0 means "no GUID".
#[derive(Clone, Copy)]
pub struct Guid<'a> {
    data: &'a [u8],
}

impl<'a> Guid<'a> {
    /// Create a view over the heap bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap size is not a multiple of 16.
    pub fn from(data: &'a [u8]) -> Result<Guid<'a>> {
        if data.len() % 16 != 0 {
            return Err(malformed_error!(
                "Size of #GUID heap is not a multiple of 16 - {}",
                data.len()
            ));
        }

        Ok(Guid { data })
    }

    /// The GUID at 1-based `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for index 0 or an index past the heap.
    pub fn get(&self, index: usize) -> Result<uguid::Guid> {
        if index < 1 || index > self.count() {
            return Err(out_of_bounds_error!());
        }

        let offset = (index - 1) * 16;
        let mut buffer = [0_u8; 16];
        buffer.copy_from_slice(&self.data[offset..offset + 16]);

        Ok(uguid::Guid::from_bytes(buffer))
    }

    /// Number of GUIDs in the heap.
    #[must_use]
    pub fn count(&self) -> usize {
        self.data.len() / 16
    }
}
