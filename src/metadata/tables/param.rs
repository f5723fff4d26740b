use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[allow(non_snake_case)]
/// `ParamAttributes` bit mask values (II.23.1.13)
pub mod ParamAttributes {
    /// Input parameter
    pub const IN: u16 = 0x0001;
    /// Output parameter
    pub const OUT: u16 = 0x0002;
    /// Optional parameter
    pub const OPTIONAL: u16 = 0x0010;
    /// Has a default value in the `Constant` table
    pub const HAS_DEFAULT: u16 = 0x1000;
    /// Has marshalling information
    pub const HAS_FIELD_MARSHAL: u16 = 0x2000;
}

/// A row of the `Param` table (ECMA-335 II.22.33).
///
/// Sequence 0 describes the return value, 1 the first parameter.
#[derive(Clone, Debug)]
pub struct ParamRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// `ParamAttributes` bit mask
    pub flags: u16,
    /// Position of the parameter, 0 for the return value
    pub sequence: u16,
    /// `#Strings` index of the parameter name
    pub name: u32,
}

impl RowReadable for ParamRaw {
    const TABLE: TableId = TableId::Param;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */   2 +
            /* sequence */2 +
            /* name */    sizes.str_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(ParamRaw {
            rid,
            token: Token::new(0x0800_0000 + rid),
            offset: *offset,
            flags: read_le_at::<u16>(data, offset)?,
            sequence: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
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
            0x02, 0x02, // sequence
            0x03, 0x00, // name
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<ParamRaw>::new(&data, 1, false, sizes).unwrap();

        let eval = |row: ParamRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x0800_0001);
            assert_eq!(row.flags, 0x0101);
            assert_eq!(row.sequence, 0x0202);
            assert_eq!(row.name, 0x03);
        };

        for row in table.iter() {
            eval(row.unwrap());
        }
        eval(table.get(1).unwrap());
    }
}
