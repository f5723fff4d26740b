use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `MemberRef` table (ECMA-335 II.22.25).
///
/// References a field or method through its parent type and signature; also used for vararg
/// call sites.
#[derive(Clone, Debug)]
pub struct MemberRefRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// Parent of the member
    pub class: CodedIndex,
    /// `#Strings` index of the member name
    pub name: u32,
    /// `#Blob` index of the member signature
    pub signature: u32,
}

impl RowReadable for MemberRefRaw {
    const TABLE: TableId = TableId::MemberRef;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* class */    sizes.coded_index_bytes(CodedIndexType::MemberRefParent) +
            /* name */     sizes.str_bytes() +
            /* signature */sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MemberRefRaw {
            rid,
            token: Token::new(0x0A00_0000 + rid),
            offset: *offset,
            class: CodedIndex::read(data, offset, sizes, CodedIndexType::MemberRefParent)?,
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
            0x08, 0x00, // class
            0x02, 0x00, // name
            0x03, 0x00, // signature
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::MethodDef, 1),
                (TableId::ModuleRef, 1),
                (TableId::TypeDef, 1),
                (TableId::TypeRef, 1),
                (TableId::TypeSpec, 1),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<MemberRefRaw>::new(&data, 1, false, sizes).unwrap();

        let eval = |row: MemberRefRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x0A00_0001);
            assert_eq!(row.class, CodedIndex::new(TableId::TypeDef, 1));
            assert_eq!(row.name, 0x02);
            assert_eq!(row.signature, 0x03);
        };

        for row in table.iter() {
            eval(row.unwrap());
        }
        eval(table.get(1).unwrap());
    }

    #[test]
    fn crafted_long() {
        let data = vec![
            0x08, 0x00, 0x00, 0x00, // class
            0x02, 0x00, 0x00, 0x00, // name
            0x03, 0x00, 0x00, 0x00, // signature
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::MethodDef, u16::MAX as u32 + 2),
                (TableId::ModuleRef, u16::MAX as u32 + 2),
                (TableId::TypeDef, u16::MAX as u32 + 2),
                (TableId::TypeRef, u16::MAX as u32 + 2),
                (TableId::TypeSpec, u16::MAX as u32 + 2),
            ],
            true,
            true,
            true,
        ));
        let table = MetadataTable::<MemberRefRaw>::new(&data, 1, false, sizes).unwrap();

        let eval = |row: MemberRefRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x0A00_0001);
            assert_eq!(row.class, CodedIndex::new(TableId::TypeDef, 1));
            assert_eq!(row.name, 0x02);
            assert_eq!(row.signature, 0x03);
        };

        for row in table.iter() {
            eval(row.unwrap());
        }
        eval(table.get(1).unwrap());
    }
}
