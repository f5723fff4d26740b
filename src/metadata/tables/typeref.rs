use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `TypeRef` table (ECMA-335 II.22.38).
///
/// Names a type defined elsewhere; `resolution_scope` says where to look for it.
#[derive(Clone, Debug)]
pub struct TypeRefRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// `Module`, `ModuleRef`, `AssemblyRef` or enclosing `TypeRef`
    pub resolution_scope: CodedIndex,
    /// `#Strings` index of the type name
    pub type_name: u32,
    /// `#Strings` index of the namespace
    pub type_namespace: u32,
}

impl RowReadable for TypeRefRaw {
    const TABLE: TableId = TableId::TypeRef;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* resolution_scope */sizes.coded_index_bytes(CodedIndexType::ResolutionScope) +
            /* type_name */       sizes.str_bytes() +
            /* type_namespace */  sizes.str_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(TypeRefRaw {
            rid,
            token: Token::new(0x0100_0000 + rid),
            offset: *offset,
            resolution_scope: CodedIndex::read(data, offset, sizes, CodedIndexType::ResolutionScope)?,
            type_name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            type_namespace: read_le_at_dyn(data, offset, sizes.is_large_str())?,
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
            0x04, 0x00, // resolution_scope
            0x02, 0x00, // type_name
            0x03, 0x00, // type_namespace
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::AssemblyRef, 1),
                (TableId::Module, 1),
                (TableId::ModuleRef, 1),
                (TableId::TypeRef, 1),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<TypeRefRaw>::new(&data, 1, false, sizes).unwrap();

        let eval = |row: TypeRefRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x0100_0001);
            assert_eq!(row.resolution_scope, CodedIndex::new(TableId::Module, 1));
            assert_eq!(row.type_name, 0x02);
            assert_eq!(row.type_namespace, 0x03);
        };

        for row in table.iter() {
            eval(row.unwrap());
        }
        eval(table.get(1).unwrap());
    }
}
