use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{CodedIndex, CodedIndexType, KeyColumn, KeyedRow, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `CustomAttribute` table (ECMA-335 II.22.10).
#[derive(Clone, Debug)]
pub struct CustomAttributeRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// The entity carrying the attribute
    pub parent: CodedIndex,
    /// Constructor of the attribute type
    pub constructor: CodedIndex,
    /// `#Blob` index of the encoded arguments
    pub value: u32,
}

impl RowReadable for CustomAttributeRaw {
    const TABLE: TableId = TableId::CustomAttribute;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* parent */     sizes.coded_index_bytes(CodedIndexType::HasCustomAttribute) +
            /* constructor */sizes.coded_index_bytes(CodedIndexType::CustomAttributeType) +
            /* value */      sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(CustomAttributeRaw {
            rid,
            token: Token::new(0x0C00_0000 + rid),
            offset: *offset,
            parent: CodedIndex::read(data, offset, sizes, CodedIndexType::HasCustomAttribute)?,
            constructor: CodedIndex::read(data, offset, sizes, CodedIndexType::CustomAttributeType)?,
            value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl KeyedRow for CustomAttributeRaw {
    const KEY: KeyColumn = KeyColumn::Coded(CodedIndexType::HasCustomAttribute);
    const KEY_IS_FIRST: bool = true;

    fn key(&self) -> Token {
        self.parent.token
    }
}
