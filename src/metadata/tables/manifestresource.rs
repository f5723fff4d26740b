use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `ManifestResource` table (ECMA-335 II.22.24).
#[derive(Clone, Debug)]
pub struct ManifestResourceRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// Offset of the resource within its file
    pub data_offset: u32,
    /// `ManifestResourceAttributes` bit mask
    pub flags: u32,
    /// `#Strings` index of the resource name
    pub name: u32,
    /// File or assembly holding the data, null for this file
    pub implementation: CodedIndex,
}

impl RowReadable for ManifestResourceRaw {
    const TABLE: TableId = TableId::ManifestResource;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* data_offset */   4 +
            /* flags */         4 +
            /* name */          sizes.str_bytes() +
            /* implementation */sizes.coded_index_bytes(CodedIndexType::Implementation)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(ManifestResourceRaw {
            rid,
            token: Token::new(0x2800_0000 + rid),
            offset: *offset,
            data_offset: read_le_at::<u32>(data, offset)?,
            flags: read_le_at::<u32>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            implementation: CodedIndex::read(data, offset, sizes, CodedIndexType::Implementation)?,
        })
    }
}
