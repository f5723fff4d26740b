use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

use strum::{EnumCount, IntoEnumIterator};

use crate::{
    file::io::read_le_at,
    metadata::tables::types::{CodedIndexType, TableId, TABLE_COUNT},
    Result,
};

/// Row count of one table together with the width its indices need.
#[derive(Clone, Copy, Default, PartialEq, Debug)]
pub struct TableRowInfo {
    /// Number of rows in the table
    pub rows: u32,
    /// Number of bits needed to represent the largest row id
    pub bits: u8,
    /// Whether a simple index into this table needs 4 bytes
    pub is_large: bool,
}

impl TableRowInfo {
    /// Compute the index width for a table with `rows` rows.
    #[must_use]
    pub fn new(rows: u32) -> Self {
        let bits = if rows == 0 {
            1
        } else {
            (u32::BITS - rows.leading_zeros()) as u8
        };

        Self {
            rows,
            bits,
            is_large: bits > 16,
        }
    }
}

/// Row counts and column widths of a table stream.
///
/// Column widths of simple and coded indices depend on the row counts of *other* tables, so
/// this is computed once from the stream header before any table is laid out. It also counts
/// every row decode, which makes lazy evaluation observable.
#[derive(Default)]
pub struct TableInfo {
    rows: Vec<TableRowInfo>,
    coded_indexes: Vec<u8>,
    is_large_index_str: bool,
    is_large_index_guid: bool,
    is_large_index_blob: bool,
    rows_read: AtomicU64,
}

/// Shared handle to [`TableInfo`], held by every table view.
pub type TableInfoRef = Arc<TableInfo>;

impl TableInfo {
    /// Read the row counts that follow the fixed tables header.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the row counts are truncated, or
    /// [`crate::Error::Malformed`] if `valid` names tables this crate does not know.
    pub fn new(data: &[u8], valid: u64) -> Result<Self> {
        if valid >> TABLE_COUNT != 0 {
            return Err(malformed_error!(
                "Valid mask names unknown tables - 0x{:016X}",
                valid
            ));
        }

        let mut rows = vec![TableRowInfo::default(); TABLE_COUNT];
        let mut next_row_offset = 24;
        for table_id in TableId::iter() {
            if valid & table_id.mask() == 0 {
                continue;
            }

            let row_count = read_le_at::<u32>(data, &mut next_row_offset)?;
            if row_count == 0 {
                log::warn!("Table {:?} is present but has no rows", table_id);
            }

            rows[table_id as usize] = TableRowInfo::new(row_count);
        }

        let heap_size_flags = data.get(6).copied().ok_or_else(|| out_of_bounds_error!())?;
        let mut table_info = TableInfo {
            rows,
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: heap_size_flags & 1 == 1,
            is_large_index_guid: heap_size_flags & 2 == 2,
            is_large_index_blob: heap_size_flags & 4 == 4,
            rows_read: AtomicU64::new(0),
        };

        table_info.calculate_coded_index_bits();
        Ok(table_info)
    }

    /// Build table info directly from row counts and heap flags.
    #[must_use]
    pub fn from_rows(
        valid_tables: &[(TableId, u32)],
        large_str: bool,
        large_blob: bool,
        large_guid: bool,
    ) -> Self {
        let mut table_info = TableInfo {
            rows: vec![TableRowInfo::default(); TABLE_COUNT],
            coded_indexes: vec![0; CodedIndexType::COUNT],
            is_large_index_str: large_str,
            is_large_index_guid: large_guid,
            is_large_index_blob: large_blob,
            rows_read: AtomicU64::new(0),
        };

        for (table_id, rows) in valid_tables {
            table_info.rows[*table_id as usize] = TableRowInfo::new(*rows);
        }

        table_info.calculate_coded_index_bits();
        table_info
    }

    /// Split a raw coded index into table and row, failing closed.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the tag selects no table, or the row id exceeds
    /// the selected table's row count.
    pub fn decode_coded_index(
        &self,
        value: u32,
        coded_index_type: CodedIndexType,
    ) -> Result<(TableId, u32)> {
        let tag_bits = coded_index_type.tag_bits();
        let tag = value & ((1 << tag_bits) - 1);
        let row = value >> tag_bits;

        let Some(Some(table)) = coded_index_type.slots().get(tag as usize) else {
            return Err(malformed_error!(
                "Invalid tag {} for coded index {:?}",
                tag,
                coded_index_type
            ));
        };

        if row > self.rows(*table) {
            return Err(malformed_error!(
                "Coded index {:?} references row {} of {:?} which has {} rows",
                coded_index_type,
                row,
                table,
                self.rows(*table)
            ));
        }

        Ok((*table, row))
    }

    /// Inverse of [`TableInfo::decode_coded_index`].
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `table` is not part of `coded_index_type`.
    pub fn encode_coded_index(
        &self,
        table: TableId,
        row: u32,
        coded_index_type: CodedIndexType,
    ) -> Result<u32> {
        let Some(tag) = coded_index_type.tag_of(table) else {
            return Err(malformed_error!(
                "{:?} can not be referenced by coded index {:?}",
                table,
                coded_index_type
            ));
        };

        Ok((row << coded_index_type.tag_bits()) | tag)
    }

    /// Number of rows of `id`, 0 for absent tables.
    #[must_use]
    pub fn rows(&self, id: TableId) -> u32 {
        self.rows[id as usize].rows
    }

    /// Whether a simple index into `id` needs 4 bytes.
    #[must_use]
    pub fn is_large(&self, id: TableId) -> bool {
        self.rows[id as usize].is_large
    }

    /// Whether `#Strings` indices are 4 bytes wide
    #[must_use]
    pub fn is_large_str(&self) -> bool {
        self.is_large_index_str
    }

    /// Whether `#GUID` indices are 4 bytes wide
    #[must_use]
    pub fn is_large_guid(&self) -> bool {
        self.is_large_index_guid
    }

    /// Whether `#Blob` indices are 4 bytes wide
    #[must_use]
    pub fn is_large_blob(&self) -> bool {
        self.is_large_index_blob
    }

    /// Width of a `#Strings` index column
    #[must_use]
    pub fn str_bytes(&self) -> u8 {
        if self.is_large_index_str {
            4
        } else {
            2
        }
    }

    /// Width of a `#GUID` index column
    #[must_use]
    pub fn guid_bytes(&self) -> u8 {
        if self.is_large_index_guid {
            4
        } else {
            2
        }
    }

    /// Width of a `#Blob` index column
    #[must_use]
    pub fn blob_bytes(&self) -> u8 {
        if self.is_large_index_blob {
            4
        } else {
            2
        }
    }

    /// Width of a simple index column into `table_id`
    #[must_use]
    pub fn table_index_bytes(&self, table_id: TableId) -> u8 {
        if self.rows[table_id as usize].is_large {
            4
        } else {
            2
        }
    }

    /// Total bits (tag plus row) a coded index needs
    #[must_use]
    pub fn coded_index_bits(&self, coded_index_type: CodedIndexType) -> u8 {
        self.coded_indexes[coded_index_type as usize]
    }

    /// Width of a coded index column
    #[must_use]
    pub fn coded_index_bytes(&self, coded_index_type: CodedIndexType) -> u8 {
        if self.coded_indexes[coded_index_type as usize] > 16 {
            4
        } else {
            2
        }
    }

    /// Count one decoded row.
    pub(crate) fn record_row_read(&self) {
        self.rows_read.fetch_add(1, Ordering::Relaxed);
    }

    /// Total number of rows decoded through any table view sharing this info.
    #[must_use]
    pub fn rows_read(&self) -> u64 {
        self.rows_read.load(Ordering::Relaxed)
    }

    fn calculate_coded_index_bits(&mut self) {
        for coded_index in CodedIndexType::iter() {
            let max_bits = coded_index
                .slots()
                .iter()
                .flatten()
                .map(|table| self.rows[*table as usize].bits)
                .max()
                .unwrap_or(1);

            self.coded_indexes[coded_index as usize] = max_bits + coded_index.tag_bits();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths() {
        let info = TableInfo::from_rows(
            &[
                (TableId::TypeDef, 0x3FFF),
                (TableId::TypeRef, 10),
                (TableId::MethodDef, 0x1_0000),
            ],
            true,
            false,
            false,
        );

        assert_eq!(info.str_bytes(), 4);
        assert_eq!(info.blob_bytes(), 2);
        assert_eq!(info.guid_bytes(), 2);
        assert_eq!(info.table_index_bytes(TableId::TypeDef), 2);
        assert_eq!(info.table_index_bytes(TableId::MethodDef), 4);
        assert_eq!(info.table_index_bytes(TableId::Field), 2);

        // 14 row bits + 2 tag bits still fit into 2 bytes
        assert_eq!(info.coded_index_bits(CodedIndexType::TypeDefOrRef), 16);
        assert_eq!(info.coded_index_bytes(CodedIndexType::TypeDefOrRef), 2);
        // MethodDef needs 17 bits on its own
        assert_eq!(info.coded_index_bytes(CodedIndexType::MethodDefOrRef), 4);
        assert_eq!(info.coded_index_bytes(CodedIndexType::CustomAttributeType), 4);
        assert_eq!(info.coded_index_bytes(CodedIndexType::ResolutionScope), 2);
    }

    #[test]
    fn coded_index_boundary() {
        // 0x4000 rows need 15 bits, plus 2 tag bits -> 4 bytes
        let info = TableInfo::from_rows(&[(TableId::TypeRef, 0x4000)], false, false, false);
        assert_eq!(info.coded_index_bytes(CodedIndexType::TypeDefOrRef), 4);
        assert_eq!(info.coded_index_bytes(CodedIndexType::HasConstant), 2);
    }

    #[test]
    fn decode() {
        let info = TableInfo::from_rows(
            &[
                (TableId::TypeDef, 4),
                (TableId::TypeRef, 4),
                (TableId::TypeSpec, 4),
                (TableId::MethodDef, 4),
                (TableId::MemberRef, 4),
            ],
            false,
            false,
            false,
        );

        assert_eq!(
            info.decode_coded_index(0b1000, CodedIndexType::TypeDefOrRef).unwrap(),
            (TableId::TypeDef, 2)
        );
        assert_eq!(
            info.decode_coded_index(0b1101, CodedIndexType::TypeDefOrRef).unwrap(),
            (TableId::TypeRef, 3)
        );
        assert_eq!(
            info.decode_coded_index(0b0010, CodedIndexType::TypeDefOrRef).unwrap(),
            (TableId::TypeSpec, 0)
        );
        // tag 3 is outside the three TypeDefOrRef tables
        assert!(info.decode_coded_index(0b0111, CodedIndexType::TypeDefOrRef).is_err());
        // row 5 is past the end
        assert!(info.decode_coded_index(0b10100, CodedIndexType::TypeDefOrRef).is_err());

        assert_eq!(
            info.decode_coded_index(0b1010, CodedIndexType::CustomAttributeType).unwrap(),
            (TableId::MethodDef, 1)
        );
        assert_eq!(
            info.decode_coded_index(0b1011, CodedIndexType::CustomAttributeType).unwrap(),
            (TableId::MemberRef, 1)
        );
        for unused in [0b1000, 0b1001, 0b1100] {
            assert!(info
                .decode_coded_index(unused, CodedIndexType::CustomAttributeType)
                .is_err());
        }

        let encoded = info
            .encode_coded_index(TableId::TypeRef, 3, CodedIndexType::TypeDefOrRef)
            .unwrap();
        assert_eq!(encoded, 0b1101);
        assert!(info
            .encode_coded_index(TableId::Field, 1, CodedIndexType::TypeDefOrRef)
            .is_err());
    }

    #[test]
    fn from_header() {
        #[rustfmt::skip]
        let data = [
            0x00, 0x00, 0x00, 0x00, // reserved
            0x02, 0x00,             // version
            0x05,                   // heap sizes
            0x01,                   // reserved
            0x05, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // valid: Module, TypeDef
            0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // sorted
            0x01, 0x00, 0x00, 0x00, // Module rows
            0x03, 0x00, 0x00, 0x00, // TypeDef rows
        ];

        let info = TableInfo::new(&data, 0x05).unwrap();
        assert_eq!(info.rows(TableId::Module), 1);
        assert_eq!(info.rows(TableId::TypeDef), 3);
        assert_eq!(info.rows(TableId::TypeRef), 0);
        assert!(info.is_large_str());
        assert!(!info.is_large_guid());
        assert!(info.is_large_blob());

        assert!(TableInfo::new(&data[..28], 0x05).is_err());
        assert!(TableInfo::new(&data, 1 << 50).is_err());
    }

    #[test]
    fn rows_read_counter() {
        let info = TableInfo::from_rows(&[], false, false, false);
        assert_eq!(info.rows_read(), 0);
        info.record_row_read();
        info.record_row_read();
        assert_eq!(info.rows_read(), 2);
    }
}
