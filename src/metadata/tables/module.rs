use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// The single row of the `Module` table (ECMA-335 II.22.30).
#[derive(Clone, Debug)]
pub struct ModuleRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// Reserved, always 0
    pub generation: u16,
    /// `#Strings` index of the module name
    pub name: u32,
    /// `#GUID` index of the module version id
    pub mvid: u32,
    /// `#GUID` index of the edit-and-continue id, reserved
    pub encid: u32,
    /// `#GUID` index of the edit-and-continue base id, reserved
    pub encbaseid: u32,
}

impl RowReadable for ModuleRaw {
    const TABLE: TableId = TableId::Module;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* generation */2 +
            /* name */      sizes.str_bytes() +
            /* mvid */      sizes.guid_bytes() +
            /* encid */     sizes.guid_bytes() +
            /* encbaseid */ sizes.guid_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(ModuleRaw {
            rid,
            token: Token::new(0x0000_0000 + rid),
            offset: *offset,
            generation: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            mvid: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
            encid: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
            encbaseid: read_le_at_dyn(data, offset, sizes.is_large_guid())?,
        })
    }
}
