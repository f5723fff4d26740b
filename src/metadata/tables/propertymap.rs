use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{KeyColumn, KeyedRow, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `PropertyMap` table (ECMA-335 II.22.35).
#[derive(Clone, Debug)]
pub struct PropertyMapRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// The type owning the properties
    pub parent: u32,
    /// First row of the type's properties
    pub property_list: u32,
}

impl RowReadable for PropertyMapRaw {
    const TABLE: TableId = TableId::PropertyMap;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* parent */       sizes.table_index_bytes(TableId::TypeDef) +
            /* property_list */sizes.table_index_bytes(TableId::Property)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(PropertyMapRaw {
            rid,
            token: Token::new(0x1500_0000 + rid),
            offset: *offset,
            parent: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
            property_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Property))?,
        })
    }
}

impl KeyedRow for PropertyMapRaw {
    const KEY: KeyColumn = KeyColumn::Table(TableId::TypeDef);
    const KEY_IS_FIRST: bool = true;

    fn key(&self) -> Token {
        Token::new(0x0200_0000 | self.parent)
    }
}
