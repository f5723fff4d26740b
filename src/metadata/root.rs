//! The metadata root and its stream directory (ECMA-335 II.24.2.1).
//!
//! The metadata root is the first structure of every metadata blob. It carries the `BSJB`
//! signature, the runtime version string and the directory of streams (`#~`, `#Strings`,
//! `#Blob`, `#GUID`, `#US`) that hold the actual tables and heaps.
//!
//! # Example
//!
//! ```rust
//! use dotmeta::metadata::root::Root;
//!
//! #[rustfmt::skip]
//! let root = Root::read(&[
//!     0x42, 0x53, 0x4A, 0x42,
//!     0x01, 0x00,
//!     0x01, 0x00,
//!     0x00, 0x00, 0x00, 0x00,
//!     0x04, 0x00, 0x00, 0x00,
//!     b'v', b'4', 0x00, 0x00,
//!     0x00, 0x00,
//!     0x01, 0x00,
//!     0x20, 0x00, 0x00, 0x00, // StreamHeader
//!     0x04, 0x00, 0x00, 0x00,
//!     0x23, 0x7E, 0x00, 0x00,
//!     0x00, 0x00, 0x00, 0x00,
//! ])?;
//! assert_eq!(root.version, "v4");
//! assert_eq!(root.stream_headers[0].name, "#~");
//! # Ok::<(), dotmeta::Error>(())
//! ```

use crate::{file::parser::Parser, metadata::streams::StreamHeader, Result};

/// The magic signature of the metadata root, `BSJB`
pub const CIL_HEADER_MAGIC: u32 = 0x424A_5342;

/// Upper bound of the version string length, as mandated by ECMA-335
const MAX_VERSION_LENGTH: u32 = 255;

/// The metadata root header.
#[derive(Debug, Clone)]
pub struct Root {
    /// Magic signature, always [`CIL_HEADER_MAGIC`]
    pub signature: u32,
    /// Major version, usually 1
    pub major_version: u16,
    /// Minor version, usually 1
    pub minor_version: u16,
    /// Reserved, always 0
    pub reserved: u32,
    /// Length of the padded version string
    pub length: u32,
    /// Runtime version string, e.g. `v4.0.30319` (`WindowsRuntime 1.4` for winmd files)
    pub version: String,
    /// Reserved, always 0
    pub flags: u16,
    /// The stream directory
    pub stream_headers: Vec<StreamHeader>,
}

impl Root {
    /// Parse the metadata root and validate every stream against the blob size.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a bad signature, an unreasonable version length,
    /// no streams, or a stream reaching past the end of `data`;
    /// [`crate::Error::OutOfBounds`] for truncated input.
    pub fn read(data: &[u8]) -> Result<Root> {
        let mut parser = Parser::new(data);

        let signature = parser.read_le::<u32>()?;
        if signature != CIL_HEADER_MAGIC {
            return Err(malformed_error!(
                "CIL_HEADER_MAGIC does not match - 0x{:08X}",
                signature
            ));
        }

        let major_version = parser.read_le::<u16>()?;
        let minor_version = parser.read_le::<u16>()?;
        let reserved = parser.read_le::<u32>()?;
        let length = parser.read_le::<u32>()?;
        if length > MAX_VERSION_LENGTH + 1 {
            return Err(malformed_error!("Invalid version string length - {}", length));
        }

        let version_bytes = parser.read_bytes(length as usize)?;
        let version_end = version_bytes
            .iter()
            .position(|byte| *byte == 0)
            .unwrap_or(version_bytes.len());
        let version = String::from_utf8_lossy(&version_bytes[..version_end]).into_owned();

        let flags = parser.read_le::<u16>()?;
        let stream_count = parser.read_le::<u16>()?;
        if stream_count == 0 {
            return Err(malformed_error!("No streams have been found"));
        }

        let mut stream_headers = Vec::with_capacity(usize::from(stream_count));
        for _ in 0..stream_count {
            let header = StreamHeader::from(&data[parser.pos()..])?;
            parser.advance_by(header.encoded_size())?;

            match header.offset.checked_add(header.size) {
                Some(end) if end as usize <= data.len() => {}
                _ => {
                    return Err(malformed_error!(
                        "Stream '{}' exceeds the metadata - offset {}, size {}",
                        header.name,
                        header.offset,
                        header.size
                    ))
                }
            }

            if stream_headers
                .iter()
                .any(|existing: &StreamHeader| existing.name == header.name)
            {
                return Err(malformed_error!("Duplicate stream - {}", header.name));
            }

            stream_headers.push(header);
        }

        Ok(Root {
            signature,
            major_version,
            minor_version,
            reserved,
            length,
            version,
            flags,
            stream_headers,
        })
    }

    /// The header of the stream named `name`, if present.
    #[must_use]
    pub fn stream(&self, name: &str) -> Option<&StreamHeader> {
        self.stream_headers.iter().find(|header| header.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x42, 0x53, 0x4A, 0x42,
            0x01, 0x00,
            0x01, 0x00,
            0x00, 0x00, 0x00, 0x40,
            0x08, 0x00, 0x00, 0x00,
            b'v', b'4', b'.', b'0', 0x00, 0x00, 0x00, 0x00,
            0x00, 0x00,
            0x02, 0x00,

            0x30, 0x00, 0x00, 0x00, // StreamHeader
            0x04, 0x00, 0x00, 0x00,
            0x23, 0x7E, 0x00, 0x00,

            0x34, 0x00, 0x00, 0x00, // StreamHeader
            0x04, 0x00, 0x00, 0x00,
            0x23, 0x55, 0x53, 0x00,

            0x00, 0x00, 0x00, 0x00,
            0x00, 0x00, 0x00, 0x00,
        ];

        let root = Root::read(&header_bytes).unwrap();

        assert_eq!(root.signature, CIL_HEADER_MAGIC);
        assert_eq!(root.major_version, 1);
        assert_eq!(root.minor_version, 1);
        assert_eq!(root.reserved, 0x4000_0000);
        assert_eq!(root.length, 8);
        assert_eq!(root.version, "v4.0");
        assert_eq!(root.stream_headers.len(), 2);
        assert_eq!(root.stream("#~").unwrap().offset, 0x30);
        assert_eq!(root.stream("#US").unwrap().offset, 0x34);
        assert!(root.stream("#Blob").is_none());
    }

    #[test]
    fn invalid() {
        // wrong signature
        assert!(Root::read(&[0x42, 0x53, 0x4A, 0x43, 0x00, 0x00]).is_err());

        #[rustfmt::skip]
        let stream_too_large = [
            0x42, 0x53, 0x4A, 0x42,
            0x01, 0x00,
            0x01, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            b'v', b'4', 0x00, 0x00,
            0x00, 0x00,
            0x01, 0x00,
            0x20, 0x00, 0x00, 0x00,
            0x00, 0x01, 0x00, 0x00,
            0x23, 0x7E, 0x00, 0x00,
        ];
        assert!(matches!(
            Root::read(&stream_too_large),
            Err(crate::Error::Malformed { .. })
        ));

        #[rustfmt::skip]
        let no_streams = [
            0x42, 0x53, 0x4A, 0x42,
            0x01, 0x00,
            0x01, 0x00,
            0x00, 0x00, 0x00, 0x00,
            0x04, 0x00, 0x00, 0x00,
            b'v', b'4', 0x00, 0x00,
            0x00, 0x00,
            0x00, 0x00,
        ];
        assert!(Root::read(&no_streams).is_err());
    }
}
