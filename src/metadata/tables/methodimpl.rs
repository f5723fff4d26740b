use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{CodedIndex, CodedIndexType, KeyColumn, KeyedRow, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `MethodImpl` table (ECMA-335 II.22.27).
#[derive(Clone, Debug)]
pub struct MethodImplRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// The type containing the override
    pub class: u32,
    /// The implementing method
    pub method_body: CodedIndex,
    /// The overridden declaration
    pub method_declaration: CodedIndex,
}

impl RowReadable for MethodImplRaw {
    const TABLE: TableId = TableId::MethodImpl;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* class */             sizes.table_index_bytes(TableId::TypeDef) +
            /* method_body */       sizes.coded_index_bytes(CodedIndexType::MethodDefOrRef) +
            /* method_declaration */sizes.coded_index_bytes(CodedIndexType::MethodDefOrRef)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MethodImplRaw {
            rid,
            token: Token::new(0x1900_0000 + rid),
            offset: *offset,
            class: read_le_at_dyn(data, offset, sizes.is_large(TableId::TypeDef))?,
            method_body: CodedIndex::read(data, offset, sizes, CodedIndexType::MethodDefOrRef)?,
            method_declaration: CodedIndex::read(data, offset, sizes, CodedIndexType::MethodDefOrRef)?,
        })
    }
}

impl KeyedRow for MethodImplRaw {
    const KEY: KeyColumn = KeyColumn::Table(TableId::TypeDef);
    const KEY_IS_FIRST: bool = true;

    fn key(&self) -> Token {
        Token::new(0x0200_0000 | self.class)
    }
}
