//! Metadata tokens and typed row indices.
//!
//! A [`Token`] is the 32-bit cross-reference currency of CLI metadata: the high byte names the
//! table, the low 24 bits hold the 1-based row id. Row id 0 is the null reference of that table.
//!
//! [`RowIndex`] is the validated, 0-based counterpart bound to one raw row type, obtained by
//! checking a token against the table it is expected to point into.

use std::{
    fmt,
    hash::{Hash, Hasher},
    marker::PhantomData,
};

use crate::{
    metadata::tables::{RowReadable, TableId},
    Result,
};

/// Largest row id a token can carry.
pub const MAX_ROW: u32 = 0x00FF_FFFF;

/// A metadata token: `(table << 24) | row`.
///
/// # Examples
///
/// ```rust
/// use dotmeta::metadata::{tables::TableId, token::Token};
///
/// let token = Token::from_parts(TableId::MethodDef, 1)?;
/// assert_eq!(token.value(), 0x0600_0001);
/// assert_eq!(token.table_id(), Some(TableId::MethodDef));
/// assert_eq!(token.row(), 1);
/// # Ok::<(), dotmeta::Error>(())
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Token(pub u32);

impl Token {
    /// Create a token from its raw value.
    #[must_use]
    pub fn new(value: u32) -> Self {
        Token(value)
    }

    /// Build a token from a table and a 1-based row id.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `row` does not fit into 24 bits.
    pub fn from_parts(table: TableId, row: u32) -> Result<Self> {
        if row > MAX_ROW {
            return Err(malformed_error!(
                "Row id 0x{:X} does not fit into a {:?} token",
                row,
                table
            ));
        }

        Ok(Token(table.token_base() | row))
    }

    /// The null token of `table`.
    #[must_use]
    pub fn null(table: TableId) -> Self {
        Token(table.token_base())
    }

    /// The raw 32-bit value.
    #[must_use]
    pub fn value(&self) -> u32 {
        self.0
    }

    /// The table number (high byte).
    #[must_use]
    pub fn table(&self) -> u8 {
        (self.0 >> 24) as u8
    }

    /// The table this token points into, if the table number is known.
    #[must_use]
    pub fn table_id(&self) -> Option<TableId> {
        TableId::from_u8(self.table())
    }

    /// The 1-based row id (low 24 bits).
    #[must_use]
    pub fn row(&self) -> u32 {
        self.0 & MAX_ROW
    }

    /// Whether the whole token is zero.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }

    /// Whether the token is the null reference of its table (row id 0).
    #[must_use]
    pub fn is_null_row(&self) -> bool {
        self.row() == 0
    }
}

impl From<u32> for Token {
    fn from(value: u32) -> Self {
        Token(value)
    }
}

impl From<Token> for u32 {
    fn from(token: Token) -> Self {
        token.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Token(0x{:08x}, table: 0x{:02x}, row: {})",
            self.0,
            self.table(),
            self.row()
        )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}", self.0)
    }
}

impl Hash for Token {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

/// A validated 0-based index into the rows of table `T`.
///
/// Converts to and from [`Token`] by adding or removing the table tag and the +1 offset of
/// row ids. Construction checks both the table tag and the row count, so holding a
/// `RowIndex<T>` means the row exists.
pub struct RowIndex<T> {
    index: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T: RowReadable> RowIndex<T> {
    /// Validate a 0-based `index` against `row_count`.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if `index >= row_count`.
    pub fn new(index: u32, row_count: u32) -> Result<Self> {
        if index >= row_count {
            return Err(malformed_error!(
                "Row index {} out of range for {:?} with {} rows",
                index,
                T::TABLE,
                row_count
            ));
        }

        Ok(RowIndex {
            index,
            _marker: PhantomData,
        })
    }

    /// Validate a token that must point into `T`'s table.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for a token of another table, a null row or a row
    /// past `row_count`.
    pub fn from_token(token: Token, row_count: u32) -> Result<Self> {
        if token.table() != T::TABLE as u8 {
            return Err(malformed_error!(
                "Token {} does not point into {:?}",
                token,
                T::TABLE
            ));
        }

        if token.is_null_row() {
            return Err(malformed_error!("Null token for {:?}", T::TABLE));
        }

        Self::new(token.row() - 1, row_count)
    }

    /// The 0-based index.
    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    /// The 1-based row id.
    #[must_use]
    pub fn rid(&self) -> u32 {
        self.index + 1
    }

    /// The token naming this row.
    #[must_use]
    pub fn token(&self) -> Token {
        Token(T::TABLE.token_base() | (self.index + 1))
    }
}

impl<T> Clone for RowIndex<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RowIndex<T> {}

impl<T> PartialEq for RowIndex<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for RowIndex<T> {}

impl<T> Hash for RowIndex<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T: RowReadable> fmt::Debug for RowIndex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RowIndex<{:?}>({})", T::TABLE, self.index)
    }
}
