use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `AssemblyRefProcessor` table. Compilers do not emit it.
#[derive(Clone, Debug)]
pub struct AssemblyRefProcessorRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// Processor id
    pub processor: u32,
    /// The reference this applies to
    pub assembly_ref: u32,
}

impl RowReadable for AssemblyRefProcessorRaw {
    const TABLE: TableId = TableId::AssemblyRefProcessor;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* processor */   4 +
            /* assembly_ref */sizes.table_index_bytes(TableId::AssemblyRef)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(AssemblyRefProcessorRaw {
            rid,
            token: Token::new(0x2400_0000 + rid),
            offset: *offset,
            processor: read_le_at::<u32>(data, offset)?,
            assembly_ref: read_le_at_dyn(data, offset, sizes.is_large(TableId::AssemblyRef))?,
        })
    }
}
