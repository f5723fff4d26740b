//! Input handling: where the metadata bytes come from and how they are located.
//!
//! A [`File`] owns the raw bytes of one input, either memory-mapped from disk or handed over as
//! a buffer, and knows the byte range of the CLI metadata root inside them. Two input shapes
//! are accepted:
//!
//! - **PE images** (`.dll`, `.exe`, `.winmd`) - the metadata root is located through the
//!   optional header's CLR runtime-header directory and the [`Cor20Header`] it points at
//! - **Bare metadata blobs** - data starting with the `BSJB` metadata signature is used as-is
//!
//! # Key Components
//!
//! - [`crate::file::Backend`] - Source of the raw bytes ([`memory::Memory`] or [`physical::Physical`])
//! - [`crate::file::io`] - Little-endian primitive reads
//! - [`crate::file::parser::Parser`] - Bounds-checked cursor used by every blob decoder
//!
//! # Examples
//!
//! ```rust,no_run
//! use dotmeta::File;
//! use std::path::Path;
//!
//! let file = File::from_file(Path::new("tests/samples/Library.dll"))?;
//! println!("metadata: {} bytes, PE: {}", file.metadata().len(), file.is_pe());
//! # Ok::<(), dotmeta::Error>(())
//! ```

pub mod io;
/// In-memory input backend
pub mod memory;
pub mod parser;
/// Memory-mapped file backend
pub mod physical;

use std::{ops::Range, path::Path};

use goblin::pe::{section_table::SectionTable, PE};

use crate::{
    metadata::{cor20header::Cor20Header, root::CIL_HEADER_MAGIC},
    Error::{Empty, GoblinErr},
    Result,
};
use memory::Memory;
use physical::Physical;

/// Backend trait for file data sources.
///
/// Abstracts over where the bytes of an input live, so that memory-mapped files and owned
/// buffers are handled identically. All implementations must be thread-safe.
pub trait Backend: Send + Sync {
    /// Returns the entire data buffer.
    fn data(&self) -> &[u8];

    /// Returns the total length of the data buffer.
    fn len(&self) -> usize;
}

/// One input file and the location of its CLI metadata.
///
/// The PE structures are only inspected while loading; afterwards the `File` keeps the raw bytes,
/// the metadata range and (for PE input) the CLR header.
pub struct File {
    /// The underlying data source (memory or file).
    data: Box<dyn Backend>,
    /// Byte range of the metadata root within `data`
    metadata: Range<usize>,
    /// The CLR header, `None` for bare metadata input
    cor20: Option<Cor20Header>,
}

impl File {
    /// Loads a file from the given path.
    ///
    /// The file is memory-mapped; it may be a PE image or a bare metadata blob.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read or opened
    /// - The file is empty
    /// - The file is neither a bare metadata blob nor a PE image with a CLR header
    pub fn from_file(file: &Path) -> Result<File> {
        let input = Physical::new(file)?;

        Self::load(input)
    }

    /// Loads a file from a memory buffer.
    ///
    /// # Errors
    ///
    /// Same as [`File::from_file`], minus the I/O failures.
    pub fn from_mem(data: Vec<u8>) -> Result<File> {
        let input = Memory::new(data);

        Self::load(input)
    }

    fn load<T: Backend + 'static>(data: T) -> Result<File> {
        if data.len() == 0 {
            return Err(Empty);
        }

        let bytes = data.data();
        if bytes.len() >= 4 && bytes[0..4] == CIL_HEADER_MAGIC.to_le_bytes() {
            let metadata = 0..bytes.len();
            return Ok(File {
                data: Box::new(data),
                metadata,
                cor20: None,
            });
        }

        let (metadata, cor20) = Self::locate_metadata(bytes)?;
        Ok(File {
            data: Box::new(data),
            metadata,
            cor20: Some(cor20),
        })
    }

    /// Walk PE optional header -> CLR directory -> CLR header -> metadata root.
    fn locate_metadata(bytes: &[u8]) -> Result<(Range<usize>, Cor20Header)> {
        let pe = PE::parse(bytes).map_err(GoblinErr)?;
        let Some(optional_header) = pe.header.optional_header else {
            return Err(malformed_error!("File does not have an OptionalHeader"));
        };
        let Some(clr_dir) = optional_header.data_directories.get_clr_runtime_header() else {
            return Err(malformed_error!(
                "File does not have a CLR runtime header directory"
            ));
        };

        let clr_offset = rva_to_offset(&pe.sections, clr_dir.virtual_address)?;
        let Some(clr_bytes) = bytes.get(clr_offset..) else {
            return Err(out_of_bounds_error!());
        };
        let cor20 = Cor20Header::read(clr_bytes)?;

        let start = rva_to_offset(&pe.sections, cor20.meta_data_rva)?;
        let Some(end) = start.checked_add(cor20.meta_data_size as usize) else {
            return Err(out_of_bounds_error!());
        };
        if end > bytes.len() {
            return Err(malformed_error!(
                "Metadata range 0x{:X}..0x{:X} exceeds file size 0x{:X}",
                start,
                end,
                bytes.len()
            ));
        }

        Ok((start..end, cor20))
    }

    /// Returns the total size of the loaded file in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the file has a length of zero.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The complete raw bytes of the input.
    #[must_use]
    pub fn data(&self) -> &[u8] {
        self.data.data()
    }

    /// The bytes of the metadata root, starting at the `BSJB` signature.
    #[must_use]
    pub fn metadata(&self) -> &[u8] {
        // The range was validated against the backend length while loading
        &self.data.data()[self.metadata.clone()]
    }

    /// The CLR header, if the input was a PE image.
    #[must_use]
    pub fn cor20header(&self) -> Option<&Cor20Header> {
        self.cor20.as_ref()
    }

    /// Whether the input was a PE image rather than a bare metadata blob.
    #[must_use]
    pub fn is_pe(&self) -> bool {
        self.cor20.is_some()
    }
}

/// Converts a relative virtual address to a file offset using the section table.
///
/// A section covers `virtual_address .. virtual_address + max(virtual_size, size_of_raw_data)`;
/// some linkers leave `virtual_size` at zero.
fn rva_to_offset(sections: &[SectionTable], rva: u32) -> Result<usize> {
    for section in sections {
        let extent = section.virtual_size.max(section.size_of_raw_data);
        let Some(section_max) = section.virtual_address.checked_add(extent) else {
            return Err(malformed_error!(
                "Section malformed, causing integer overflow - {} + {}",
                section.virtual_address,
                extent
            ));
        };

        if section.virtual_address <= rva && rva < section_max {
            return Ok((rva - section.virtual_address) as usize
                + section.pointer_to_raw_data as usize);
        }
    }

    Err(malformed_error!(
        "RVA could not be converted to offset - 0x{:X}",
        rva
    ))
}
