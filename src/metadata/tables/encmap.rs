use crate::{
    file::io::read_le_at,
    metadata::{
        tables::{RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `EncMap` table.
#[derive(Clone, Debug)]
pub struct EncMapRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// Mapped token
    pub token_value: u32,
}

impl RowReadable for EncMapRaw {
    const TABLE: TableId = TableId::EncMap;

    #[rustfmt::skip]
    fn row_size(_sizes: &TableInfoRef) -> u32 {
        /* token_value */4
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, _sizes: &TableInfoRef) -> Result<Self> {
        Ok(EncMapRaw {
            rid,
            token: Token::new(0x1F00_0000 + rid),
            offset: *offset,
            token_value: read_le_at::<u32>(data, offset)?,
        })
    }
}
