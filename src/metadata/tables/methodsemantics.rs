use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, KeyColumn, KeyedRow, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

#[allow(non_snake_case)]
/// `MethodSemanticsAttributes` values (II.23.1.12)
pub mod MethodSemanticsAttributes {
    /// Property setter
    pub const SETTER: u16 = 0x0001;
    /// Property getter
    pub const GETTER: u16 = 0x0002;
    /// Other accessor of a property or event
    pub const OTHER: u16 = 0x0004;
    /// Event `add` accessor
    pub const ADD_ON: u16 = 0x0008;
    /// Event `remove` accessor
    pub const REMOVE_ON: u16 = 0x0010;
    /// Event `raise` accessor
    pub const FIRE: u16 = 0x0020;
}

/// A row of the `MethodSemantics` table (ECMA-335 II.22.28).
///
/// Ties a getter, setter, adder, remover, raiser or other accessor to its property or event.
#[derive(Clone, Debug)]
pub struct MethodSemanticsRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// `MethodSemanticsAttributes` bit mask
    pub semantics: u16,
    /// The accessor method
    pub method: u32,
    /// The property or event
    pub association: CodedIndex,
}

impl RowReadable for MethodSemanticsRaw {
    const TABLE: TableId = TableId::MethodSemantics;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* semantics */  2 +
            /* method */     sizes.table_index_bytes(TableId::MethodDef) +
            /* association */sizes.coded_index_bytes(CodedIndexType::HasSemantics)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MethodSemanticsRaw {
            rid,
            token: Token::new(0x1800_0000 + rid),
            offset: *offset,
            semantics: read_le_at::<u16>(data, offset)?,
            method: read_le_at_dyn(data, offset, sizes.is_large(TableId::MethodDef))?,
            association: CodedIndex::read(data, offset, sizes, CodedIndexType::HasSemantics)?,
        })
    }
}

impl KeyedRow for MethodSemanticsRaw {
    const KEY: KeyColumn = KeyColumn::Coded(CodedIndexType::HasSemantics);
    const KEY_IS_FIRST: bool = false;

    fn key(&self) -> Token {
        self.association.token
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
            0x01, 0x01, // semantics
            0x02, 0x00, // method
            0x02, 0x00, // association
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::Event, 1),
                (TableId::MethodDef, 1),
                (TableId::Property, 1),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<MethodSemanticsRaw>::new(&data, 1, false, sizes).unwrap();

        let eval = |row: MethodSemanticsRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x1800_0001);
            assert_eq!(row.semantics, 0x0101);
            assert_eq!(row.method, 0x02);
            assert_eq!(row.association, CodedIndex::new(TableId::Event, 1));
        };

        for row in table.iter() {
            eval(row.unwrap());
        }
        eval(table.get(1).unwrap());
    }
}
