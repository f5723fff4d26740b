use crate::{
    file::io::read_le_at_dyn,
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `MethodSpec` table (ECMA-335 II.22.29).
#[derive(Clone, Debug)]
pub struct MethodSpecRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// The generic method
    pub method: CodedIndex,
    /// `#Blob` index of the instantiation signature
    pub instantiation: u32,
}

impl RowReadable for MethodSpecRaw {
    const TABLE: TableId = TableId::MethodSpec;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* method */       sizes.coded_index_bytes(CodedIndexType::MethodDefOrRef) +
            /* instantiation */sizes.blob_bytes()
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(MethodSpecRaw {
            rid,
            token: Token::new(0x2B00_0000 + rid),
            offset: *offset,
            method: CodedIndex::read(data, offset, sizes, CodedIndexType::MethodDefOrRef)?,
            instantiation: read_le_at_dyn(data, offset, sizes.is_large_blob())?,
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
            0x02, 0x00, // method
            0x02, 0x00, // instantiation
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::MemberRef, 1),
                (TableId::MethodDef, 1),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<MethodSpecRaw>::new(&data, 1, false, sizes).unwrap();

        let eval = |row: MethodSpecRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x2B00_0001);
            assert_eq!(row.method, CodedIndex::new(TableId::MethodDef, 1));
            assert_eq!(row.instantiation, 0x02);
        };

        for row in table.iter() {
            eval(row.unwrap());
        }
        eval(table.get(1).unwrap());
    }
}
