use crate::{
    file::io::{read_le_at, read_le_at_dyn},
    metadata::{
        tables::{CodedIndex, CodedIndexType, RowReadable, TableId, TableInfoRef},
        token::Token,
    },
    Result,
};

/// A row of the `Event` table (ECMA-335 II.22.13).
#[derive(Clone, Debug)]
pub struct EventRaw {
    /// 1-based row id
    pub rid: u32,
    /// Token of this row
    pub token: Token,
    /// Byte offset of the row within the table
    pub offset: usize,
    /// `EventAttributes` bit mask
    pub flags: u16,
    /// `#Strings` index of the event name
    pub name: u32,
    /// Delegate type of the event handler
    pub event_type: CodedIndex,
}

impl RowReadable for EventRaw {
    const TABLE: TableId = TableId::Event;

    #[rustfmt::skip]
    fn row_size(sizes: &TableInfoRef) -> u32 {
        u32::from(
            /* flags */     2 +
            /* name */      sizes.str_bytes() +
            /* event_type */sizes.coded_index_bytes(CodedIndexType::TypeDefOrRef)
        )
    }

    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self> {
        Ok(EventRaw {
            rid,
            token: Token::new(0x1400_0000 + rid),
            offset: *offset,
            flags: read_le_at::<u16>(data, offset)?,
            name: read_le_at_dyn(data, offset, sizes.is_large_str())?,
            event_type: CodedIndex::read(data, offset, sizes, CodedIndexType::TypeDefOrRef)?,
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
            0x04, 0x00, // event_type
        ];

        let sizes = Arc::new(TableInfo::from_rows(
            &[
                (TableId::TypeDef, 1),
                (TableId::TypeRef, 1),
                (TableId::TypeSpec, 1),
            ],
            false,
            false,
            false,
        ));
        let table = MetadataTable::<EventRaw>::new(&data, 1, false, sizes).unwrap();

        let eval = |row: EventRaw| {
            assert_eq!(row.rid, 1);
            assert_eq!(row.token.value(), 0x1400_0001);
            assert_eq!(row.flags, 0x0101);
            assert_eq!(row.name, 0x02);
            assert_eq!(row.event_type, CodedIndex::new(TableId::TypeDef, 1));
        };

        for row in table.iter() {
            eval(row.unwrap());
        }
        eval(table.get(1).unwrap());
    }
}
