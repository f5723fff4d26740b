use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{CodedIndex, CodedIndexType, KeyColumn, KeyedRow, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `FieldMarshal` table (ECMA-335 II.22.17).
#[derive(Clone, Debug)]
pub struct FieldMarshalRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// The marshalled field or parameter
    pub parent: CodedIndex,
    /// `#Blob` index of the marshalling descriptor
    pub native_type: u32,
}

impl RowReadable for FieldMarshalRaw {
    const TABLE: TableId = TableId::FieldMarshal;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* parent */     sizes.coded_index_bytes(CodedIndexType::HasFieldMarshal) +
            /* native_type */sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(FieldMarshalRaw {
            rid,
            token: Token::new(0x0D00_0000 + rid),
            offset: *offset,
            parent: CodedIndex::read(data, offset, sizes, CodedIndexType::HasFieldMarshal)?,
            native_type: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl KeyedRow for FieldMarshalRaw {
    const KEY: KeyColumn = KeyColumn::Coded(CodedIndexType::HasFieldMarshal);
    const KEY_IS_FIRST: bool = true;

    fn key(&self) -> Token {
        self.parent.token
    }
}
