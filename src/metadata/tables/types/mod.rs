//! Shared machinery of the physical table layer.
//!
//! - [`TableId`] / [`CodedIndexType`] / [`CodedIndex`] - table identities and coded references
//! - [`TableInfo`] - row counts and the resulting column widths
//! - [`MetadataTable`] - random-access view over the rows of one table
//! - [`RowReadable`] / [`KeyedRow`] - implemented by every raw row type

mod codedindex;
mod tableaccess;
mod tabledata;
mod tableid;
mod tableinfo;

use std::marker::PhantomData;

use crate::{metadata::token::Token, Result};

pub use codedindex::{CodedIndex, CodedIndexType};
pub use tabledata::TableData;
pub use tableid::{TableId, TABLE_COUNT};
pub use tableinfo::{TableInfo, TableInfoRef, TableRowInfo};

pub(crate) use tableaccess::{create_table_match, impl_table_access};
pub use tableaccess::TableAccess;

/// A raw row type that can be decoded from the table stream.
pub trait RowReadable: Sized + Send {
    /// The table this row type belongs to
    const TABLE: TableId;

    /// Size of one row in bytes, given the column widths in `sizes`.
    fn row_size(sizes: &TableInfoRef) -> u32;

    /// Decode the row with id `rid` starting at `offset`, advancing `offset` past it.
    ///
    /// # Errors
    /// Returns an error if a column is out of bounds or a coded index is invalid.
    fn row_read(data: &[u8], offset: &mut usize, rid: u32, sizes: &TableInfoRef) -> Result<Self>;
}

/// How the key column of a [`KeyedRow`] is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyColumn {
    /// A simple index into one table
    Table(TableId),
    /// A coded index
    Coded(CodedIndexType),
}

/// A row type that is looked up by a parent reference (its primary key).
pub trait KeyedRow: RowReadable {
    /// Encoding of the key column
    const KEY: KeyColumn;

    /// Whether the key is the first column, the precondition for binary search
    const KEY_IS_FIRST: bool;

    /// The key of this row as a token.
    fn key(&self) -> Token;
}

/// Random-access view over the rows of one metadata table.
///
/// Row ids are 1-based, as in tokens. Reading a row decodes it from the stream bytes every
/// time; callers that need a row repeatedly keep the decoded value.
pub struct MetadataTable<'a, T> {
    data: &'a [u8],
    row_count: u32,
    row_size: u32,
    sorted: bool,
    sizes: TableInfoRef,
    _phantom: PhantomData<fn() -> T>,
}

impl<'a, T: RowReadable> MetadataTable<'a, T> {
    /// Create a view over `row_count` rows at the start of `data`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `data` is shorter than the table.
    pub fn new(data: &'a [u8], row_count: u32, sorted: bool, sizes: TableInfoRef) -> Result<Self> {
        let row_size = T::row_size(&sizes);
        let Some(size) = (row_count as usize).checked_mul(row_size as usize) else {
            return Err(malformed_error!("Size of {:?} overflows", T::TABLE));
        };

        if size > data.len() {
            return Err(malformed_error!(
                "Table {:?} with {} rows of {} bytes exceeds the table stream",
                T::TABLE,
                row_count,
                row_size
            ));
        }

        Ok(MetadataTable {
            data: &data[..size],
            row_count,
            row_size,
            sorted,
            sizes,
            _phantom: PhantomData,
        })
    }

    /// Total size of the table in bytes.
    #[must_use]
    pub fn size(&self) -> u64 {
        u64::from(self.row_count) * u64::from(self.row_size)
    }

    /// Size of one row in bytes.
    #[must_use]
    pub fn row_size(&self) -> u32 {
        self.row_size
    }

    /// Number of rows.
    #[must_use]
    pub fn row_count(&self) -> u32 {
        self.row_count
    }

    /// Whether the `Sorted` bit is set for this table.
    #[must_use]
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Decode the row with 1-based id `rid`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `rid` is 0 or past the last row, or if a column
    /// of the row is invalid.
    pub fn get(&self, rid: u32) -> Result<T> {
        if rid == 0 || rid > self.row_count {
            return Err(malformed_error!(
                "Row {} out of range for {:?} with {} rows",
                rid,
                T::TABLE,
                self.row_count
            ));
        }

        self.sizes.record_row_read();
        T::row_read(
            self.data,
            &mut ((rid as usize - 1) * self.row_size as usize),
            rid,
            &self.sizes,
        )
    }

    /// Iterate over all rows in order.
    #[must_use]
    pub fn iter(&self) -> TableIterator<'_, 'a, T> {
        TableIterator {
            table: self,
            next_rid: 1,
        }
    }
}

impl<'a, T: KeyedRow> MetadataTable<'a, T> {
    /// Any row whose key equals `key`.
    ///
    /// # Errors
    /// Returns an error if a visited row fails to decode.
    pub fn find_any(&self, key: Token) -> Result<Option<T>> {
        if self.can_bisect() {
            let Some(sort_key) = self.sort_key(key) else {
                return Ok(None);
            };

            let first = self.lower_bound(sort_key)?;
            if first <= self.row_count {
                let row = self.get(first)?;
                if row.key() == key {
                    return Ok(Some(row));
                }
            }

            return Ok(None);
        }

        for row in self.iter() {
            let row = row?;
            if row.key() == key {
                return Ok(Some(row));
            }
        }

        Ok(None)
    }

    /// All rows whose key equals `key`, in table order.
    ///
    /// # Errors
    /// Returns an error if a visited row fails to decode.
    pub fn find_all(&self, key: Token) -> Result<Vec<T>> {
        let mut result = Vec::new();

        if self.can_bisect() {
            let Some(sort_key) = self.sort_key(key) else {
                return Ok(result);
            };

            let mut rid = self.lower_bound(sort_key)?;
            while rid <= self.row_count {
                let row = self.get(rid)?;
                if row.key() != key {
                    break;
                }

                result.push(row);
                rid += 1;
            }

            return Ok(result);
        }

        for row in self.iter() {
            let row = row?;
            if row.key() == key {
                result.push(row);
            }
        }

        Ok(result)
    }

    fn can_bisect(&self) -> bool {
        self.sorted && T::KEY_IS_FIRST
    }

    /// The key as stored in the column, which is the order of a sorted table.
    fn sort_key(&self, key: Token) -> Option<u32> {
        match T::KEY {
            KeyColumn::Table(table) => (key.table() == table as u8).then(|| key.row()),
            KeyColumn::Coded(coded_index) => {
                let table = key.table_id()?;
                self.sizes
                    .encode_coded_index(table, key.row(), coded_index)
                    .ok()
            }
        }
    }

    /// First rid whose stored key is not less than `sort_key`; `row_count + 1` if none.
    fn lower_bound(&self, sort_key: u32) -> Result<u32> {
        let mut low = 1;
        let mut high = self.row_count + 1;

        while low < high {
            let mid = low + (high - low) / 2;
            let row_key = self.get(mid)?.key();
            match self.sort_key(row_key) {
                Some(value) if value < sort_key => low = mid + 1,
                _ => high = mid,
            }
        }

        Ok(low)
    }
}

/// Iterator over the rows of a [`MetadataTable`].
pub struct TableIterator<'t, 'a, T> {
    table: &'t MetadataTable<'a, T>,
    next_rid: u32,
}

impl<T: RowReadable> Iterator for TableIterator<'_, '_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next_rid > self.table.row_count {
            return None;
        }

        let row = self.table.get(self.next_rid);
        self.next_rid += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.table.row_count + 1 - self.next_rid) as usize;
        (remaining, Some(remaining))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::metadata::tables::NestedClassRaw;

    #[rustfmt::skip]
    const NESTED: [u8; 16] = [
        0x02, 0x00, 0x01, 0x00, // 2 nested in 1
        0x03, 0x00, 0x01, 0x00, // 3 nested in 1
        0x04, 0x00, 0x03, 0x00, // 4 nested in 3
        0x05, 0x00, 0x01, 0x00, // 5 nested in 1
    ];

    fn table(sorted: bool) -> MetadataTable<'static, NestedClassRaw> {
        let sizes = Arc::new(TableInfo::from_rows(
            &[(TableId::NestedClass, 4), (TableId::TypeDef, 5)],
            false,
            false,
            false,
        ));
        MetadataTable::new(&NESTED, 4, sorted, sizes).unwrap()
    }

    #[test]
    fn get_and_iter() {
        let table = table(true);
        assert_eq!(table.row_size(), 4);
        assert_eq!(table.size(), 16);
        assert_eq!(table.get(3).unwrap().enclosing_class, 3);
        assert!(table.get(0).is_err());
        assert!(table.get(5).is_err());
        assert_eq!(table.iter().count(), 4);
        assert!(table.iter().all(|row| row.is_ok()));
    }

    #[test]
    fn find_sorted() {
        // NestedClass is keyed by its first column, the nested type
        let table = table(true);
        let row = table.find_any(Token::new(0x0200_0004)).unwrap().unwrap();
        assert_eq!(row.enclosing_class, 3);
        assert!(table.find_any(Token::new(0x0200_0001)).unwrap().is_none());
        assert_eq!(table.find_all(Token::new(0x0200_0005)).unwrap().len(), 1);
        assert!(table.find_all(Token::new(0x0400_0002)).unwrap().is_empty());
    }

    #[test]
    fn find_unsorted() {
        let table = table(false);
        let rows = table.find_all(Token::new(0x0200_0003)).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rid, 2);
    }

    #[test]
    fn too_short() {
        let sizes = Arc::new(TableInfo::from_rows(&[], false, false, false));
        assert!(MetadataTable::<NestedClassRaw>::new(&NESTED, 5, false, sizes).is_err());
    }
}
