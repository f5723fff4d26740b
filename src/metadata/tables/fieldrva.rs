use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{KeyColumn, KeyedRow, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `FieldRVA` table (ECMA-335 II.22.18).
#[derive(Clone, Debug)]
pub struct FieldRvaRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// RVA of the initial field data
    pub rva: u32,
    /// The field
    pub field: u32,
}

impl RowReadable for FieldRvaRaw {
    const TABLE: TableId = TableId::FieldRVA;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* rva */  4 +
            /* field */sizes.table_index_bytes(TableId::Field)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(FieldRvaRaw {
            rid,
            token: Token::new(0x1D00_0000 + rid),
            offset: *offset,
            rva: read_le_at::<u32>(data, offset)?,
            field: read_le_at_dyn(data, offset, sizes.is_large(TableId::Field))?,
        })
    }
}

impl KeyedRow for FieldRvaRaw {
    const KEY: KeyColumn = KeyColumn::Table(TableId::Field);
    const KEY_IS_FIRST: bool = false;

    fn key(&self) -> Token {
        Token::new(0x0400_0000 | self.field)
    }
}
