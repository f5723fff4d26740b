use crate::{
    file::io::read_le_at,
    metadata::{
        tables::{RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `AssemblyProcessor` table. Compilers do not emit it.
#[derive(Clone, Debug)]
pub struct AssemblyProcessorRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// Processor id
    pub processor: u32,
}

impl RowReadable for AssemblyProcessorRaw {
    const TABLE: TableId = TableId::AssemblyProcessor;

    #[rustfmt::skip]
    fn row_size(_sizes: &TableInfoRef) -> u32 {
        /* processor */4
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, _sizes: &TableInfoRef) -> Result<Self> {
        Ok(AssemblyProcessorRaw {
            rid,
            token: Token::new(0x2100_0000 + rid),
            offset: *offset,
            processor: read_le_at::<u32>(data, offset)?,
        })
    }
}
