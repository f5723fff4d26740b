use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `EventPtr` indirection table.
#[derive(Clone, Debug)]
pub struct EventPtrRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// The `Event` row this position maps to
    pub event: u32,
}

impl RowReadable for EventPtrRaw {
    const TABLE: TableId = TableId::EventPtr;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* event */sizes.table_index_bytes(TableId::Event)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(EventPtrRaw {
            rid,
            token: Token::new(0x1300_0000 + rid),
            offset: *offset,
            event: read_le_at_dyn(data, offset, sizes.is_large(TableId::Event))?,
        })
    }
}
