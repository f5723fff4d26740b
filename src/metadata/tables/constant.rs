use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, KeyColumn, KeyedRow, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `Constant` table (ECMA-335 II.22.9).
///
/// The element type byte is followed by a padding byte that must be zero; it is read and
/// dropped.
#[derive(Clone, Debug)]
pub struct ConstantRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// `ELEMENT_TYPE_*` of the value
    pub base: u8,
    /// The field, parameter or property owning the value
    pub parent: CodedIndex,
    /// `#Blob` index of the value bytes
    pub value: u32,
}

impl RowReadable for ConstantRaw {
    const TABLE: TableId = TableId::Constant;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* base */    1 +
            /* padding */ 1 +
            /* parent */  sizes.coded_index_bytes(CodedIndexType::HasConstant) +
            /* value */   sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        let row_offset = *offset;
        let base = read_le_at::<u8>(data, offset)?;
        let _padding = read_le_at::<u8>(data, offset)?;
        let parent = CodedIndex::read(data, offset, sizes, CodedIndexType::HasConstant)?;
        let value = read_le_at_dyn(data, offset, sizes.is_large_blob())?;

        Ok(ConstantRaw {
            rid,
            token: Token::new(0x0B00_0000 + rid),
            offset: row_offset,
            base,
            parent,
            value,
        })
    }
}

impl KeyedRow for ConstantRaw {
    const KEY: KeyColumn = KeyColumn::Coded(CodedIndexType::HasConstant);
    const KEY_IS_FIRST: bool = false;

    fn key(&self) -> Token {
        self.parent.token
    }
}
