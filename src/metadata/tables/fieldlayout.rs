use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{KeyColumn, KeyedRow, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `FieldLayout` table (ECMA-335 II.22.16).
#[derive(Clone, Debug)]
pub struct FieldLayoutRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// Offset of the field within its type
    pub field_offset: u32,
    /// The field
    pub field: u32,
}

impl RowReadable for FieldLayoutRaw {
    const TABLE: TableId = TableId::FieldLayout;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* field_offset */4 +
            /* field */       sizes.table_index_bytes(TableId::Field)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(FieldLayoutRaw {
            rid,
            token: Token::new(0x1000_0000 + rid),
            offset: *offset,
            field_offset: read_le_at::<u32>(data, offset)?,
            field: read_le_at_dyn(data, offset, sizes.is_large(TableId::Field))?,
        })
    }
}

impl KeyedRow for FieldLayoutRaw {
    const KEY: KeyColumn = KeyColumn::Table(TableId::Field);
    const KEY_IS_FIRST: bool = false;

    fn key(&self) -> Token {
        Token::new(0x0400_0000 | self.field)
    }
}
