use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, KeyColumn, KeyedRow, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `ImplMap` table (ECMA-335 II.22.22).
#[derive(Clone, Debug)]
pub struct ImplMapRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// `PInvokeAttributes` bit mask
    pub mapping_flags: u16,
    /// The forwarded method
    pub member_forwarded: CodedIndex,
    /// `#Strings` index of the native entry point
    pub import_name: u32,
    /// The native module
    pub import_scope: u32,
}

impl RowReadable for ImplMapRaw {
    const TABLE: TableId = TableId::ImplMap;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* mapping_flags */   2 +
            /* member_forwarded */sizes.coded_index_bytes(CodedIndexType::MemberForwarded) +
            /* import_name */     sizes.str_bytes() +
            /* import_scope */    sizes.table_index_bytes(TableId::ModuleRef)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(ImplMapRaw {
            rid,
            token: Token::new(0x1C00_0000 + rid),
            offset: *offset,
            mapping_flags: read_le_at::<u16>(data, offset)?,
            member_forwarded: CodedIndex::read(data, offset, sizes, CodedIndexType::MemberForwarded)?,
            import_name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            import_scope: read_le_at_dyn(data, offset, sizes.is_large(TableId::ModuleRef))?,
        })
    }
}

impl KeyedRow for ImplMapRaw {
    const KEY: KeyColumn = KeyColumn::Coded(CodedIndexType::MemberForwarded);
    const KEY_IS_FIRST: bool = false;

    fn key(&self) -> Token {
        self.member_forwarded.token
    }
}
