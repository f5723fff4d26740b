//! The `#Strings` heap: NUL-terminated UTF-8 identifiers addressed by byte offset.

use std::{ffi::CStr, str};

use crate::Result;

/// The `#Strings` heap (ECMA-335 II.24.2.3).
///
/// Holds the names of types, members and namespaces. Index 0 is always the empty string.
///
/// # Examples
///
/// ```rust
/// use dotmeta::Strings;
///
/// let heap = Strings::from(b"\0Object\0System\0")?;
/// assert_eq!(heap.get(1)?, "Object");
/// assert_eq!(heap.get(8)?, "System");
/// assert_eq!(heap.get(0)?, "");
/// # Ok::<(), dotmeta::Error>(())
/// ```
#[derive(Clone, Copy)]
pub struct Strings<'a> {
    data: &'a [u8],
}

impl<'a> Strings<'a> {
    /// Create a view over the heap bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap is empty or does not start with NUL.
    pub fn from(data: &'a [u8]) -> Result<Strings<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Provided #Strings heap is empty"));
        }

        Ok(Strings { data })
    }

    /// The string starting at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for an index past the heap, or
    /// [`crate::Error::Malformed`] for unterminated or non-UTF-8 data.
    pub fn get(&self, index: usize) -> Result<&'a str> {
        if index >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let Ok(value) = CStr::from_bytes_until_nul(&self.data[index..]) else {
            return Err(malformed_error!("Unterminated string at index - {}", index));
        };

        match value.to_str() {
            Ok(value) => Ok(value),
            Err(_) => Err(malformed_error!("Invalid UTF-8 string at index - {}", index)),
        }
    }

    /// Size of the heap in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the heap has no bytes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data: [u8; 47] = [
            0x00,
            0x3c, 0x4d, 0x6f, 0x64, 0x75, 0x6c, 0x65, 0x3e, 0x00,
            0x53, 0x79, 0x73, 0x74, 0x65, 0x6d, 0x2e, 0x43, 0x6f, 0x6e, 0x73, 0x6f, 0x6c, 0x65, 0x00,
            0x53, 0x79, 0x73, 0x74, 0x65, 0x6d, 0x2e, 0x52, 0x75, 0x6e, 0x74, 0x69, 0x6d, 0x65, 0x00,
            0x4c, 0x69, 0x73, 0x74, 0x60, 0x31, 0x00,
        ];

        let strings = Strings::from(&data).unwrap();

        assert_eq!(strings.get(0).unwrap(), "");
        assert_eq!(strings.get(1).unwrap(), "<Module>");
        assert_eq!(strings.get(10).unwrap(), "System.Console");
        assert_eq!(strings.get(25).unwrap(), "System.Runtime");
        assert_eq!(strings.get(40).unwrap(), "List`1");
        // offsets into the middle of a string are valid
        assert_eq!(strings.get(17).unwrap(), "Console");
    }

    #[test]
    fn invalid() {
        assert!(Strings::from(&[]).is_err());
        assert!(Strings::from(&[0x41, 0x00]).is_err());

        let strings = Strings::from(&[0x00, 0x41, 0x42]).unwrap();
        assert!(matches!(strings.get(1), Err(crate::Error::Malformed { .. })));
        assert!(matches!(strings.get(3), Err(crate::Error::OutOfBounds { .. })));

        let strings = Strings::from(&[0x00, 0xFF, 0xFE, 0x00]).unwrap();
        assert!(strings.get(1).is_err());
    }
}
