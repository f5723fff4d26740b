use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, KeyColumn, KeyedRow, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[allow(non_snake_case)]
/// `GenericParamAttributes` bit mask values (II.23.1.7)
pub mod GenericParamAttributes {
    /// Mask for the variance bits
    pub const VARIANCE_MASK: u16 = 0x0003;
    /// Invariant
    pub const NONE: u16 = 0x0000;
    /// Covariant (`out`)
    pub const COVARIANT: u16 = 0x0001;
    /// Contravariant (`in`)
    pub const CONTRAVARIANT: u16 = 0x0002;
    /// Mask for the special constraint bits
    pub const SPECIAL_CONSTRAINT_MASK: u16 = 0x001C;
    /// `class` constraint
    pub const REFERENCE_TYPE_CONSTRAINT: u16 = 0x0004;
    /// `struct` constraint
    pub const NOT_NULLABLE_VALUE_TYPE_CONSTRAINT: u16 = 0x0008;
    /// `new()` constraint
    pub const DEFAULT_CONSTRUCTOR_CONSTRAINT: u16 = 0x0010;
}

/// A row of the `GenericParam` table (ECMA-335 II.22.20).
#[derive(Clone, Debug)]
pub struct GenericParamRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// 0-based position within the owner's parameter list
    pub number: u16,
    /// `GenericParamAttributes` bit mask
    pub flags: u16,
    /// The declaring type or method
    pub owner: CodedIndex,
    /// `#Strings` index of the parameter name
    pub name: u32,
}

impl RowReadable for GenericParamRaw {
    const TABLE: TableId = TableId::GenericParam;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* number */2 +
            /* flags */ 2 +
            /* owner */ sizes.coded_index_bytes(CodedIndexType::TypeOrMethodDef) +
            /* name */  sizes.str_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(GenericParamRaw {
            rid,
            token: Token::new(0x2A00_0000 + rid),
            offset: *offset,
            number: read_le_at::<u16>(data, offset)?,
            flags: read_le_at::<u16>(data, offset)?,
            owner: CodedIndex::read(data, offset, sizes, CodedIndexType::TypeOrMethodDef)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
        })
    }
}

impl KeyedRow for GenericParamRaw {
    const KEY: KeyColumn = KeyColumn::Coded(CodedIndexType::TypeOrMethodDef);
    const KEY_IS_FIRST: bool = false;

    fn key(&self) -> Token {
        self.owner.token
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
            0x01, 0x01, // number
            0x02, 0x02, // flags
            0x02, 0x00, // owner
            0x04, 0x00, // name
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::MethodDef, 1),
                (TableId::TypeDef, 1),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<GenericParamRaw>::new(&data, 1, false, sizes).unwrap();

        let eval = |row: GenericParamRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x2A00_0001);
            assert_eq!(row.number, 0x0101);
            assert_eq!(row.flags, 0x0202);
            assert_eq!(row.owner, CodedIndex::new(TableId::TypeDef, 1));
            assert_eq!(row.name, 0x04);
        };

        for row in table.iter() {
            eval(row.unwrap());
        }
        eval(table.get(1).unwrap());
    }
}
