use crate::metadata::tables::{MetadataTable, RowReadable};

/// Typed access to one table of a [`crate::metadata::streams::TablesHeader`].
///
/// Implemented once per raw row type, so `header.table::<TypeDefRaw>()` selects the table by
/// type instead of by id.
pub trait TableAccess<'a, T: RowReadable> {
    /// The table, if the stream contains it.
    fn table(&self) -> Option<&MetadataTable<'a, T>>;
}

/// Implements [`TableAccess`] for one raw row type and its [`super::TableData`] variant.
macro_rules! impl_table_access {
    ($(($id:path, $raw:ty, $variant:ident)),* $(,)?) => {
        $(
            impl<'a> TableAccess<'a, $raw> for TablesHeader<'a> {
                fn table(&self) -> Option<&MetadataTable<'a, $raw>> {
                    match self.tables.get($id as usize)? {
                        Some(TableData::$variant(table)) => Some(table),
                        _ => None,
                    }
                }
            }
        )*
    };
}

/// Builds the [`super::TableData`] for `$table_id`, advancing `$offset` past the table.
macro_rules! create_table_match {
    ($table_id:expr, $data:expr, $rows:expr, $sorted:expr, $info:expr, $offset:expr, $(($id:path, $raw:ty, $variant:ident)),* $(,)?) => {
        match $table_id {
            $(
                $id => {
                    let table = MetadataTable::<$raw>::new($data, $rows, $sorted, $info.clone())?;
                    *$offset += table.size() as usize;
                    TableData::$variant(table)
                }
            )*
        }
    };
}

pub(crate) use create_table_match;
pub(crate) use impl_table_access;
