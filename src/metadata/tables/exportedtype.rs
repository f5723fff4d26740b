use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `ExportedType` table (ECMA-335 II.22.14).
///
/// With an `AssemblyRef` implementation the row is a type forwarder.
#[derive(Clone, Debug)]
pub struct ExportedTypeRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// `TypeAttributes` bit mask
    pub flags: u32,
    /// Hint for the `TypeDef` row in the target module
    pub type_def_id: u32,
    /// `#Strings` index of the type name
    pub type_name: u32,
    /// `#Strings` index of the namespace
    pub type_namespace: u32,
    /// Where the type lives: `File`, `AssemblyRef` or enclosing `ExportedType`
    pub implementation: CodedIndex,
}

impl RowReadable for ExportedTypeRaw {
    const TABLE: TableId = TableId::ExportedType;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */         4 +
            /* type_def_id */   4 +
            /* type_name */     sizes.str_bytes() +
            /* type_namespace */sizes.str_bytes() +
            /* implementation */sizes.coded_index_bytes(CodedIndexType::Implementation)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(ExportedTypeRaw {
            rid,
            token: Token::new(0x2700_0000 + rid),
            offset: *offset,
            flags: read_le_at::<u32>(data, offset)?,
            type_def_id: read_le_at::<u32>(data, offset)?,
            type_name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            type_namespace: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            implementation: CodedIndex::read(data, offset, sizes, CodedIndexType::Implementation)?,
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
            0x01, 0x01, 0x01, 0x01, // flags
            0x02, 0x02, 0x02, 0x02, // type_def_id
            0x03, 0x00, // type_name
            0x04, 0x00, // type_namespace
            0x04, 0x00, // implementation
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::AssemblyRef, 1),
                (TableId::ExportedType, 1),
                (TableId::File, 1),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<ExportedTypeRaw>::new(&data, 1, false, sizes).unwrap();

        let eval = |row: ExportedTypeRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x2700_0001);
            assert_eq!(row.flags, 0x01010101);
            assert_eq!(row.type_def_id, 0x02020202);
            assert_eq!(row.type_name, 0x03);
            assert_eq!(row.type_namespace, 0x04);
            assert_eq!(row.implementation, CodedIndex::new(TableId::File, 1));
        };

        for row in table.iter() {
            eval(row.unwrap());
        }
        eval(table.get(1).unwrap());
    }
}
