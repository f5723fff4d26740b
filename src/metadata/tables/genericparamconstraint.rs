use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{CodedIndex, CodedIndexType, KeyColumn, KeyedRow, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `GenericParamConstraint` table (ECMA-335 II.22.21).
#[derive(Clone, Debug)]
pub struct GenericParamConstraintRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// The constrained parameter
    pub owner: u32,
    /// The constraint type
    pub constraint: CodedIndex,
}

impl RowReadable for GenericParamConstraintRaw {
    const TABLE: TableId = TableId::GenericParamConstraint;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* owner */     sizes.table_index_bytes(TableId::GenericParam) +
            /* constraint */sizes.coded_index_bytes(CodedIndexType::TypeDefOrRef)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(GenericParamConstraintRaw {
            rid,
            token: Token::new(0x2C00_0000 + rid),
            offset: *offset,
            owner: read_le_at_dyn(data, offset, sizes.is_large(TableId::GenericParam))?,
            constraint: CodedIndex::read(data, offset, sizes, CodedIndexType::TypeDefOrRef)?,
        })
    }
}

impl KeyedRow for GenericParamConstraintRaw {
    const KEY: KeyColumn = KeyColumn::Table(TableId::GenericParam);
    const KEY_IS_FIRST: bool = true;

    fn key(&self) -> Token {
        Token::new(0x2A00_0000 | self.owner)
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
            0x01, 0x00, // owner
            0x04, 0x00, // constraint
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::GenericParam, 1),
                (TableId::TypeDef, 1),
                (TableId::TypeRef, 1),
                (TableId::TypeSpec, 1),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<GenericParamConstraintRaw>::new(&data, 1, false, sizes).unwrap();

        let eval = |row: GenericParamConstraintRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x2C00_0001);
            assert_eq!(row.owner, 0x01);
            assert_eq!(row.constraint, CodedIndex::new(TableId::TypeDef, 1));
        };

        for row in table.iter() {
            eval(row.unwrap());
        }
        eval(table.get(1).unwrap());
    }
}
