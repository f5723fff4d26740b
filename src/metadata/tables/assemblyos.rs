use crate::{
    file::io::read_le_at,
    metadata::{
        tables::{RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `AssemblyOS` table. Compilers do not emit it.
#[derive(Clone, Debug)]
pub struct AssemblyOsRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// Platform id
    pub os_platform_id: u32,
    /// Major OS version
    pub os_major_version: u32,
    /// Minor OS version
    pub os_minor_version: u32,
}

impl RowReadable for AssemblyOsRaw {
    const TABLE: TableId = TableId::AssemblyOS;

    #[rustfmt::skip]
    fn row_size(_sizes: &TableInfoRef) -> u32 {
        /* os_platform_id */  4 +
        /* os_major_version */4 +
        /* os_minor_version */4
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, _sizes: &TableInfoRef) -> Result<Self> {
        Ok(AssemblyOsRaw {
            rid,
            token: Token::new(0x2200_0000 + rid),
            offset: *offset,
            os_platform_id: read_le_at::<u32>(data, offset)?,
            os_major_version: read_le_at::<u32>(data, offset)?,
            os_minor_version: read_le_at::<u32>(data, offset)?,
        })
    }
}
