use crate::{file::io::read_le, Result};

/// Maximum length of a stream name, including the terminating NUL.
const MAX_NAME_LENGTH: usize = 32;

/// One entry of the stream directory that follows the metadata root (ECMA-335 II.24.2.2).
///
/// The header is followed by the next one at `8 + name length + NUL`, padded to a 4-byte
/// boundary; [`StreamHeader::encoded_size`] computes that stride.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamHeader {
    /// Offset of the stream, relative to the metadata root
    pub offset: u32,
    /// Size of the stream in bytes
    pub size: u32,
    /// Name of the stream, e.g. `#~` or `#Strings`
    pub name: String,
}

impl StreamHeader {
    /// Parse a stream header from the start of `data`.
    ///
    /// Names are not validated here; the caller decides what to do with unknown streams.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the data is too short, or
    /// [`crate::Error::Malformed`] if the name is unterminated or not ASCII.
    pub fn from(data: &[u8]) -> Result<StreamHeader> {
        if data.len() < 9 {
            return Err(out_of_bounds_error!());
        }

        let name_area = &data[8..data.len().min(8 + MAX_NAME_LENGTH)];
        let Some(name_length) = name_area.iter().position(|byte| *byte == 0) else {
            return Err(malformed_error!("Unterminated stream header name"));
        };

        let name_bytes = &name_area[..name_length];
        if !name_bytes.is_ascii() {
            return Err(malformed_error!("Invalid stream header name - {:02X?}", name_bytes));
        }

        Ok(StreamHeader {
            offset: read_le::<u32>(data)?,
            size: read_le::<u32>(&data[4..])?,
            name: name_bytes.iter().map(|byte| char::from(*byte)).collect(),
        })
    }

    /// Number of bytes this header occupies in the stream directory.
    #[must_use]
    pub fn encoded_size(&self) -> usize {
        8 + ((self.name.len() + 1 + 3) & !3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x23, 0x7E, 0x00, 0x00,
        ];

        let parsed_header = StreamHeader::from(&header_bytes).unwrap();

        assert_eq!(parsed_header.offset, 0x6C);
        assert_eq!(parsed_header.size, 0x45A4);
        assert_eq!(parsed_header.name, "#~");
        assert_eq!(parsed_header.encoded_size(), 12);
    }

    #[test]
    fn padding() {
        let header = StreamHeader {
            offset: 0,
            size: 0,
            name: "#Strings".to_string(),
        };
        assert_eq!(header.encoded_size(), 20);

        let header = StreamHeader {
            offset: 0,
            size: 0,
            name: "#US".to_string(),
        };
        assert_eq!(header.encoded_size(), 12);
    }

    #[test]
    fn crafted_invalid() {
        #[rustfmt::skip]
        let header_bytes = [
            0x6C, 0x00, 0x00, 0x00,
            0xA4, 0x45, 0x00, 0x00,
            0x23, 0x7E, 0x7E,
        ];

        assert!(StreamHeader::from(&header_bytes).is_err());
        assert!(StreamHeader::from(&header_bytes[..8]).is_err());
    }
}
