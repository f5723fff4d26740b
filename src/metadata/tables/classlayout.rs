use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{KeyColumn, KeyedRow, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `ClassLayout` table (ECMA-335 II.22.8).
#[derive(Clone, Debug)]
pub struct ClassLayoutRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// Field alignment, a power of two up to 128 or 0
    pub packing_size: u16,
    /// Minimum size of the type in bytes
    pub class_size: u32,
    /// The type this layout applies to
    pub parent: u32,
}

impl RowReadable for ClassLayoutRaw {
    const TABLE: TableId = TableId::ClassLayout;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* packing_size */2 +
            /* class_size */  4 +
            /* parent */      sizes.table_index_bytes(TableId::TypeDef)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(ClassLayoutRaw {
            rid,
            token: Token::new(0x0F00_0000 + rid),
            offset: *offset,
            packing_size: read_le_at::<u16>(data, offset)?,
            class_size: read_le_at::<u32>(data, offset)?,
            parent: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
        })
    }
}

impl KeyedRow for ClassLayoutRaw {
    const KEY: KeyColumn = KeyColumn::Table(TableId::TypeDef);
    const KEY_IS_FIRST: bool = false;

    fn key(&self) -> Token {
        Token::new(0x0200_0000 | self.parent)
    }
}
