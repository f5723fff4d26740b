use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{KeyColumn, KeyedRow, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `NestedClass` table (ECMA-335 II.22.32).
#[derive(Clone, Debug)]
pub struct NestedClassRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// The nested type
    pub nested_class: u32,
    /// The enclosing type
    pub enclosing_class: u32,
}

impl RowReadable for NestedClassRaw {
    const TABLE: TableId = TableId::NestedClass;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* nested_class */   sizes.table_index_bytes(TableId::TypeDef) +
            /* enclosing_class */sizes.table_index_bytes(TableId::TypeDef)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(NestedClassRaw {
            rid,
            token: Token::new(0x2900_0000 + rid),
            offset: *offset,
            nested_class: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
            enclosing_class: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
        })
    }
}

impl KeyedRow for NestedClassRaw {
    const KEY: KeyColumn = KeyColumn::Table(TableId::TypeDef);
    const KEY_IS_FIRST: bool = true;

    fn key(&self) -> Token {
        Token::new(0x0200_0000 | self.nested_class)
    }
}
