use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `File` table (ECMA-335 II.22.19).
#[derive(Clone, Debug)]
pub struct FileRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// `FileAttributes` bit mask
    pub flags: u32,
    /// `#Strings` index of the file name
    pub name: u32,
    /// `#Blob` index of the file hash
    pub hash_value: u32,
}

impl RowReadable for FileRaw {
    const TABLE: TableId = TableId::File;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */     4 +
            /* name */      sizes.str_bytes() +
            /* hash_value */sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(FileRaw {
            rid,
            token: Token::new(0x2600_0000 + rid),
            offset: *offset,
            flags: read_le_at::<u32>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            hash_value: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
        })
    }
}
