use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[allow(non_snake_case)]
/// `FieldAttributes` bit mask values (II.23.1.5)
pub mod FieldAttributes {
    /// Mask for the member access bits
    pub const FIELD_ACCESS_MASK: u16 = 0x0007;
    /// Defined on the type rather than per instance
    pub const STATIC: u16 = 0x0010;
    /// Can only be assigned during initialization
    pub const INIT_ONLY: u16 = 0x0020;
    /// Compile-time constant
    pub const LITERAL: u16 = 0x0040;
    /// Not serialized when the type is remoted
    pub const NOT_SERIALIZED: u16 = 0x0080;
    /// Has an RVA in the `FieldRVA` table
    pub const HAS_FIELD_RVA: u16 = 0x0100;
    /// The name is special
    pub const SPECIAL_NAME: u16 = 0x0200;
    /// The runtime treats the name specially
    pub const RT_SPECIAL_NAME: u16 = 0x0400;
    /// Has marshalling information
    pub const HAS_FIELD_MARSHAL: u16 = 0x1000;
    /// Has a default value in the `Constant` table
    pub const HAS_DEFAULT: u16 = 0x8000;
}

/// A row of the `Field` table (ECMA-335 II.22.15).
#[derive(Clone, Debug)]
pub struct FieldRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// `FieldAttributes` bit mask
    pub flags: u16,
    /// `#Strings` index of the field name
    pub name: u32,
    /// `#Blob` index of the field signature
    pub signature: u32,
}

impl RowReadable for FieldRaw {
    const TABLE: TableId = TableId::Field;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */    2 +
            /* name */     sizes.str_bytes() +
            /* signature */sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(FieldRaw {
            rid,
            token: Token::new(0x0400_0000 + rid),
            offset: *offset,
            flags: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            signature: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
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
            0x01, 0x01, // flags
            0x02, 0x00, // name
            0x03, 0x00, // signature
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<FieldRaw>::new(&data, 1, false, sizes).unwrap();

        let eval = |row: FieldRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x0400_0001);
            assert_eq!(row.flags, 0x0101);
            assert_eq!(row.name, 0x02);
            assert_eq!(row.signature, 0x03);
        };

        for row in table.iter() {
            eval(row.unwrap());
        }
        eval(table.get(1).unwrap());
    }
}
