//! The `#Blob` heap: length-prefixed binary values such as signatures and constants.

use crate::{file::parser::Parser, Result};

/// The `#Blob` heap (ECMA-335 II.24.2.4).
///
/// Every entry starts with a compressed unsigned length followed by that many bytes. Index 0 is
/// the empty blob.
///
/// # Examples
///
/// ```rust
/// use dotmeta::Blob;
///
/// let heap = Blob::from(&[0x00, 0x03, 0x06, 0x08, 0x00])?;
/// assert_eq!(heap.get(1)?, &[0x06, 0x08, 0x00]);
/// assert!(heap.get(0)?.is_empty());
/// # Ok::<(), dotmeta::Error>(())
/// ```
#[derive(Clone, Copy)]
pub struct Blob<'a> {
    data: &'a [u8],
}

impl<'a> Blob<'a> {
    /// Create a view over the heap bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap is empty or does not start with 0.
    pub fn from(data: &'a [u8]) -> Result<Blob<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Invalid memory for #Blob heap"));
        }

        Ok(Blob { data })
    }

    /// The blob starting at `index`, without its length prefix.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the index or the encoded length runs past the
    /// heap, or [`crate::Error::Malformed`] for an invalid length prefix.
    pub fn get(&self, index: usize) -> Result<&'a [u8]> {
        if index >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let mut parser = Parser::new(&self.data[index..]);
        let len = parser.read_compressed_uint()? as usize;
        parser.read_bytes(len)
    }

    /// Iterate over all blobs as `(index, data)` pairs, skipping the empty blob at 0.
    #[must_use]
    pub fn iter(&self) -> BlobIterator<'a> {
        BlobIterator {
            blob: *self,
            position: 1,
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

/// Iterator over the entries of a [`Blob`] heap.
///
/// Stops after the first malformed entry.
pub struct BlobIterator<'a> {
    blob: Blob<'a>,
    position: usize,
}

impl<'a> Iterator for BlobIterator<'a> {
    type Item = Result<(usize, &'a [u8])>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.blob.data.len() {
            return None;
        }

        let start = self.position;
        let mut parser = Parser::new(&self.blob.data[start..]);
        let entry = parser
            .read_compressed_uint()
            .and_then(|len| parser.read_bytes(len as usize));

        match entry {
            Ok(data) => {
                self.position += parser.pos();
                Some(Ok((start, data)))
            }
            Err(error) => {
                self.position = self.blob.data.len();
                Some(Err(error))
            }
        }
    }
}
