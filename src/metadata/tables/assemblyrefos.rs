use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `AssemblyRefOS` table. Compilers do not emit it.
#[derive(Clone, Debug)]
pub struct AssemblyRefOsRaw {
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
    /// The reference this applies to
    pub assembly_ref: u32,
}

impl RowReadable for AssemblyRefOsRaw {
    const TABLE: TableId = TableId::AssemblyRefOS;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* os_platform_id */  4 +
            /* os_major_version */4 +
            /* os_minor_version */4 +
            /* assembly_ref */    sizes.table_index_bytes(TableId::AssemblyRef)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(AssemblyRefOsRaw {
            rid,
            token: Token::new(0x2500_0000 + rid),
            offset: *offset,
            os_platform_id: read_le_at::<u32>(data, offset)?,
            os_major_version: read_le_at::<u32>(data, offset)?,
            os_minor_version: read_le_at::<u32>(data, offset)?,
            assembly_ref: read_le_at_dyn(data, offset, sizes.is_large(TableId::AssemblyRef))?,
        })
    }
}
