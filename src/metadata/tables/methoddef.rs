use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[allow(non_snake_case)]
/// `MethodAttributes` bit mask values (II.23.1.10)
pub mod MethodAttributes {
    /// Mask for the member access bits
    pub const MEMBER_ACCESS_MASK: u16 = 0x0007;
    /// Defined on the type rather than per instance
    pub const STATIC: u16 = 0x0010;
    /// Cannot be overridden
    pub const FINAL: u16 = 0x0020;
    /// Virtual
    pub const VIRTUAL: u16 = 0x0040;
    /// Hides by name and signature rather than by name only
    pub const HIDE_BY_SIG: u16 = 0x0080;
    /// Always gets a new vtable slot
    pub const NEW_SLOT: u16 = 0x0100;
    /// Can only be overridden where accessible
    pub const STRICT: u16 = 0x0200;
    /// Has no implementation
    pub const ABSTRACT: u16 = 0x0400;
    /// The name is special
    pub const SPECIAL_NAME: u16 = 0x0800;
    /// The runtime treats the name specially
    pub const RT_SPECIAL_NAME: u16 = 0x1000;
    /// Implemented through P/Invoke
    pub const PINVOKE_IMPL: u16 = 0x2000;
}

/// A row of the `MethodDef` table (ECMA-335 II.22.26).
#[derive(Clone, Debug)]
pub struct MethodDefRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// RVA of the method body, 0 for abstract and runtime methods
    pub rva: u32,
    /// `MethodImplAttributes` bit mask
    pub impl_flags: u16,
    /// `MethodAttributes` bit mask
    pub flags: u16,
    /// `#Strings` index of the method name
    pub name: u32,
    /// `#Blob` index of the method signature
    pub signature: u32,
    /// First row of this method's parameters
    pub param_list: u32,
}

impl RowReadable for MethodDefRaw {
    const TABLE: TableId = TableId::MethodDef;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* rva */       4 +
            /* impl_flags */2 +
            /* flags */     2 +
            /* name */      sizes.str_bytes() +
            /* signature */ sizes.blob_bytes() +
            /* param_list */sizes.table_index_bytes(TableId::Param)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MethodDefRaw {
            rid,
            token: Token::new(0x0600_0000 + rid),
            offset: *offset,
            rva: read_le_at::<u32>(data, offset)?,
            impl_flags: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
            param_list: read_le_at_dyn(data, offset, sizes.is_large(TableId::Param))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metadata::tables::{MetadataTable, TableInfo};

    #[test]
    fn crafted_short() {
        let data = vec![
            0x01, 0x01, 0x01, 0x01, // rva
            0x02, 0x02, // impl_flags
            0x03, 0x03, // flags
            0x04, 0x00, // name
            0x05, 0x00, // signature
            0x06, 0x00, // param_list
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::Param, 1),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<MethodDefRaw>::new(&data, 1, false, sizes).unwrap();

        let eval = |row: MethodDefRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x0600_0001);
            assert_eq!(row.rva, 0x01010101);
            assert_eq!(row.impl_flags, 0x0202);
            assert_eq!(row.flags, 0x0303);
            assert_eq!(row.name, 0x04);
            assert_eq!(row.signature, 0x05);
            assert_eq!(row.param_list, 0x06);
        };

        for row in table.iter() {
            eval(row.unwrap());
        }
        eval(table.get(1).unwrap());
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x01, 0x01, 0x01, 0x01, // rva
            0x02, 0x02, // impl_flags
            0x03, 0x03, // flags
            0x04, 0x00, 0x00, 0x00, // name
            0x05, 0x00, 0x00, 0x00, // signature
            0x06, 0x00, 0x00, 0x00, // param_list
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::Param, u16::MAX as u32 + 2),
            ],
            true,
            true,
            true,
        ));
        let table = MetadataTable::<MethodDefRaw>::new(&data, 1, false, sizes).unwrap();

        let eval = |row: MethodDefRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x0600_0001);
            assert_eq!(row.rva, 0x01010101);
            assert_eq!(row.impl_flags, 0x0202);
            assert_eq!(row.flags, 0x0303);
            assert_eq!(row.name, 0x04);
            assert_eq!(row.signature, 0x05);
            assert_eq!(row.param_list, 0x06);
        };

        for row in table.iter() {
            eval(row.unwrap());
        }
        eval(table.get(1).unwrap());
    }
}
