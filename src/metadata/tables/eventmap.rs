use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{KeyColumn, KeyedRow, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `EventMap` table (ECMA-335 II.22.12).
#[derive(Clone, Debug)]
pub struct EventMapRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// The type owning the events
    pub parent: u32,
    /// First row of the type's events
    pub event_list: u32,
}

impl RowReadable for EventMapRaw {
    const TABLE: TableId = TableId::EventMap;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* parent */    sizes.table_index_bytes(TableId::TypeDef) +
            /* event_list */sizes.table_index_bytes(TableId::Event)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(EventMapRaw {
            rid,
            token: Token::new(0x1200_0000 + rid),
            offset: *offset,
            parent: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
            event_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Event))?,
        })
    }
}

impl KeyedRow for EventMapRaw {
    const KEY: KeyColumn = KeyColumn::Table(TableId::TypeDef);
    const KEY_IS_FIRST: bool = true;

    fn key(&self) -> Token {
        Token::new(0x0200_0000 | self.parent)
    }
}
