use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, KeyColumn, KeyedRow, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `DeclSecurity` table (ECMA-335 II.22.11).
#[derive(Clone, Debug)]
pub struct DeclSecurityRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// Security action
    pub action: u16,
    /// Type, method or assembly the permission set applies to
    pub parent: CodedIndex,
    /// `#Blob` index of the permission set
    pub permission_set: u32,
}

impl RowReadable for DeclSecurityRaw {
    const TABLE: TableId = TableId::DeclSecurity;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* action */        2 +
            /* parent */        sizes.coded_index_bytes(CodedIndexType::HasDeclSecurity) +
            /* permission_set */sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(DeclSecurityRaw {
            rid,
            token: Token::new(0x0E00_0000 + rid),
            offset: *offset,
            action: read_le_at::<u16>(data, offset)?,
            parent: CodedIndex::read(data, offset, sizes, CodedIndexType::HasDeclSecurity)?,
            permission_set: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}

impl KeyedRow for DeclSecurityRaw {
    const KEY: KeyColumn = KeyColumn::Coded(CodedIndexType::HasDeclSecurity);
    const KEY_IS_FIRST: bool = false;

    fn key(&self) -> Token {
        self.parent.token
    }
}
