//! The CLR runtime header (`IMAGE_COR20_HEADER`, ECMA-335 II.25.3.3).
//!
//! The optional header's CLR data directory points at this 72-byte structure, which in turn
//! locates the metadata root.

use bitflags::bitflags;

use crate::{file::parser::Parser, metadata::token::Token, Result};

bitflags! {
    /// Runtime flags of a managed image.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CorFlags: u32 {
        /// Image contains only IL
        const IL_ONLY = 0x0000_0001;
        /// Image can only be loaded into a 32-bit process
        const REQUIRE_32BIT = 0x0000_0002;
        /// Image is strong-name signed
        const STRONG_NAME_SIGNED = 0x0000_0008;
        /// The entry point is a native RVA, not a token
        const NATIVE_ENTRYPOINT = 0x0000_0010;
        /// Debug data is tracked
        const TRACK_DEBUG_DATA = 0x0001_0000;
        /// Prefer 32-bit execution on 64-bit platforms
        const PREFER_32BIT = 0x0002_0000;
    }
}

/// The subset of the CLR header needed to find and describe the metadata.
#[derive(Debug, Clone)]
pub struct Cor20Header {
    /// Size of the header in bytes, at least 72
    pub cb: u32,
    /// Runtime version the image was built for (major)
    pub major_runtime_version: u16,
    /// Runtime version the image was built for (minor)
    pub minor_runtime_version: u16,
    /// RVA of the metadata root
    pub meta_data_rva: u32,
    /// Size of the metadata in bytes
    pub meta_data_size: u32,
    /// Runtime flags
    pub flags: CorFlags,
    /// Entry point method token (or native RVA with [`CorFlags::NATIVE_ENTRYPOINT`])
    pub entry_point_token: u32,
    /// RVA of the managed resources
    pub resource_rva: u32,
    /// Size of the managed resources
    pub resource_size: u32,
    /// RVA of the strong name signature
    pub strong_name_signature_rva: u32,
    /// Size of the strong name signature
    pub strong_name_signature_size: u32,
}

impl Cor20Header {
    /// Size of the header as defined by ECMA-335.
    pub const SIZE: usize = 72;

    /// Parse the header from the bytes the CLR data directory points to.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] for short input and [`crate::Error::Malformed`]
    /// if the size field or metadata location is invalid.
    pub fn read(data: &[u8]) -> Result<Cor20Header> {
        if data.len() < Self::SIZE {
            return Err(out_of_bounds_error!());
        }

        let mut parser = Parser::new(data);
        let cb = parser.read_le::<u32>()?;
        if (cb as usize) < Self::SIZE {
            return Err(malformed_error!("Invalid CLR header size - {}", cb));
        }

        let major_runtime_version = parser.read_le::<u16>()?;
        let minor_runtime_version = parser.read_le::<u16>()?;
        let meta_data_rva = parser.read_le::<u32>()?;
        let meta_data_size = parser.read_le::<u32>()?;
        if meta_data_rva == 0 || meta_data_size == 0 {
            return Err(malformed_error!(
                "CLR header does not locate any metadata - rva 0x{:X}, size {}",
                meta_data_rva,
                meta_data_size
            ));
        }

        let flags = CorFlags::from_bits_retain(parser.read_le::<u32>()?);
        let entry_point_token = parser.read_le::<u32>()?;
        let resource_rva = parser.read_le::<u32>()?;
        let resource_size = parser.read_le::<u32>()?;
        let strong_name_signature_rva = parser.read_le::<u32>()?;
        let strong_name_signature_size = parser.read_le::<u32>()?;

        Ok(Cor20Header {
            cb,
            major_runtime_version,
            minor_runtime_version,
            meta_data_rva,
            meta_data_size,
            flags,
            entry_point_token,
            resource_rva,
            resource_size,
            strong_name_signature_rva,
            strong_name_signature_size,
        })
    }

    /// The managed entry point, if the image has one and it is a metadata token.
    #[must_use]
    pub fn entry_point(&self) -> Option<Token> {
        if self.entry_point_token == 0 || self.flags.contains(CorFlags::NATIVE_ENTRYPOINT) {
            None
        } else {
            Some(Token::new(self.entry_point_token))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crafted() {
        #[rustfmt::skip]
        let header_bytes = [
            0x48, 0x00, 0x00, 0x00, // cb
            0x02, 0x00,             // major_runtime_version
            0x05, 0x00,             // minor_runtime_version
            0x80, 0x20, 0x00, 0x00, // meta_data_rva
            0x00, 0x10, 0x00, 0x00, // meta_data_size
            0x09, 0x00, 0x00, 0x00, // flags
            0x01, 0x00, 0x00, 0x06, // entry_point_token
            0x00, 0x00, 0x00, 0x00, // resource_rva
            0x00, 0x00, 0x00, 0x00, // resource_size
            0x00, 0x00, 0x00, 0x00, // strong_name_signature_rva
            0x00, 0x00, 0x00, 0x00, // strong_name_signature_size
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // code_manager_table
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // vtable_fixups
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // export_address_table_jmp
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // managed_native_header
        ];

        let header = Cor20Header::read(&header_bytes).unwrap();
        assert_eq!(header.cb, 72);
        assert_eq!(header.major_runtime_version, 2);
        assert_eq!(header.minor_runtime_version, 5);
        assert_eq!(header.meta_data_rva, 0x2080);
        assert_eq!(header.meta_data_size, 0x1000);
        assert!(header.flags.contains(CorFlags::IL_ONLY | CorFlags::STRONG_NAME_SIGNED));
        assert_eq!(header.entry_point(), Some(Token::new(0x0600_0001)));
    }

    #[test]
    fn invalid() {
        assert!(Cor20Header::read(&[0x48, 0x00, 0x00, 0x00]).is_err());

        let mut header_bytes = [0_u8; 72];
        header_bytes[0] = 0x48;
        // no metadata location
        assert!(matches!(
            Cor20Header::read(&header_bytes),
            Err(crate::Error::Malformed { .. })
        ));
    }
}
