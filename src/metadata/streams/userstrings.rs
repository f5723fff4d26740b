//! The `#US` heap: UTF-16 string literals.

use widestring::U16String;

use crate::{file::parser::Parser, Result};

/// The `#US` (user strings) heap (ECMA-335 II.24.2.4).
///
/// Laid out like the `#Blob` heap; each entry holds UTF-16LE code units followed by one extra
/// byte flagging whether any character needs special handling.
#[derive(Clone, Copy)]
pub struct UserStrings<'a> {
    data: &'a [u8],
}

impl<'a> UserStrings<'a> {
    /// Create a view over the heap bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the heap is empty or does not start with 0.
    pub fn from(data: &'a [u8]) -> Result<UserStrings<'a>> {
        if data.is_empty() || data[0] != 0 {
            return Err(malformed_error!("Invalid memory for #US heap"));
        }

        Ok(UserStrings { data })
    }

    /// The string starting at `index`.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the entry runs past the heap.
    pub fn get(&self, index: usize) -> Result<U16String> {
        if index >= self.data.len() {
            return Err(out_of_bounds_error!());
        }

        let mut parser = Parser::new(&self.data[index..]);
        let len = parser.read_compressed_uint()? as usize;
        let bytes = parser.read_bytes(len)?;

        // The trailing odd byte is the special-character flag
        Ok(utf16_from_le_bytes(&bytes[..len & !1]))
    }
}

/// Decode UTF-16LE bytes; a dangling odd byte is ignored.
pub(crate) fn utf16_from_le_bytes(bytes: &[u8]) -> U16String {
    let units: Vec<u16> = bytes
        .chunks_exact(2)
        .map(|pair| u16::from_le_bytes([pair[0], pair[1]]))
        .collect();

    U16String::from_vec(units)
}

#[cfg(test)]
mod tests {
    use widestring::u16str;

    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let data: [u8; 29] = [
            0x00,
            0x1b, 0x48, 0x00, 0x65, 0x00, 0x6c, 0x00, 0x6c, 0x00, 0x6f, 0x00, 0x2c, 0x00, 0x20, 0x00,
                  0x57, 0x00, 0x6f, 0x00, 0x72, 0x00, 0x6c, 0x00, 0x64, 0x00, 0x21, 0x00, 0x00,
        ];

        let us_str = UserStrings::from(&data).unwrap();

        assert_eq!(us_str.get(1).unwrap(), u16str!("Hello, World!"));
        assert!(us_str.get(0).unwrap().is_empty());
    }

    #[test]
    fn invalid() {
        assert!(UserStrings::from(&[]).is_err());
        assert!(UserStrings::from(&[0x22, 0x1b]).is_err());

        let us_str = UserStrings::from(&[0x00, 0x09, 0x41, 0x00]).unwrap();
        assert!(us_str.get(1).is_err());
    }
}
