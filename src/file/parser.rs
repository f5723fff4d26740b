//! Bounds-checked byte cursor.
//!
//! [`Parser`] is the substrate every blob and signature decoder consumes. It never reads past
//! the end of its slice; every accessor returns [`crate::Result`] instead.

use crate::{
    file::io::{read_le_at, CilIO},
    metadata::token::Token,
    Result,
};

/// A generic binary data parser for reading .NET metadata structures.
///
/// The cursor only moves forward on successful reads. Once a read fails the caller is expected
/// to drop the parser together with the error; partially decoded values are never returned.
///
/// # Examples
///
/// ```rust
/// use dotmeta::Parser;
///
/// let data = [0x03, 0x80, 0x80, 0x2A];
/// let mut parser = Parser::new(&data);
///
/// assert_eq!(parser.read_compressed_uint()?, 3);
/// assert_eq!(parser.read_compressed_uint()?, 0x80);
/// assert_eq!(parser.read_le::<u8>()?, 0x2A);
/// assert!(!parser.has_more_data());
/// # Ok::<(), dotmeta::Error>(())
/// ```
pub struct Parser<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    /// Create a new parser positioned at the start of `data`.
    #[must_use]
    pub fn new(data: &'a [u8]) -> Self {
        Parser { data, position: 0 }
    }

    /// Total length of the underlying slice.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the underlying slice is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether unread bytes remain.
    #[must_use]
    pub fn has_more_data(&self) -> bool {
        self.position < self.data.len()
    }

    /// Number of unread bytes.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.position)
    }

    /// Current position.
    #[must_use]
    pub fn pos(&self) -> usize {
        self.position
    }

    /// Move to an absolute position.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if `pos` is past the end of the data.
    pub fn seek(&mut self, pos: usize) -> Result<()> {
        if pos > self.data.len() {
            return Err(out_of_bounds_error!());
        }

        self.position = pos;
        Ok(())
    }

    /// Skip one byte.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the data.
    pub fn advance(&mut self) -> Result<()> {
        self.advance_by(1)
    }

    /// Skip `step` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `step` bytes remain.
    pub fn advance_by(&mut self, step: usize) -> Result<()> {
        if step > self.remaining() {
            return Err(out_of_bounds_error!());
        }

        self.position += step;
        Ok(())
    }

    /// Look at the next byte without consuming it.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] at the end of the data.
    pub fn peek_byte(&self) -> Result<u8> {
        match self.data.get(self.position) {
            Some(byte) => Ok(*byte),
            None => Err(out_of_bounds_error!()),
        }
    }

    /// Consume the next byte if it equals `expected`.
    ///
    /// Returns `false` (and consumes nothing) if it differs or no data is left.
    pub fn consume_if(&mut self, expected: u8) -> bool {
        if self.data.get(self.position) == Some(&expected) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    /// Read a little-endian primitive.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if the value does not fit.
    pub fn read_le<T: CilIO>(&mut self) -> Result<T> {
        read_le_at::<T>(self.data, &mut self.position)
    }

    /// Borrow the next `length` bytes.
    ///
    /// # Errors
    /// Returns [`crate::Error::OutOfBounds`] if fewer than `length` bytes remain.
    pub fn read_bytes(&mut self, length: usize) -> Result<&'a [u8]> {
        if length > self.remaining() {
            return Err(out_of_bounds_error!());
        }

        let bytes = &self.data[self.position..self.position + length];
        self.position += length;
        Ok(bytes)
    }

    /// Read an ECMA-335 compressed unsigned integer (II.23.2).
    ///
    /// | first byte | total size | value bits |
    /// |------------|------------|------------|
    /// | `0xxxxxxx` | 1          | 7          |
    /// | `10xxxxxx` | 2          | 14         |
    /// | `110xxxxx` | 4          | 29         |
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for the reserved `111xxxxx` pattern and
    /// [`crate::Error::OutOfBounds`] if the encoding is truncated.
    pub fn read_compressed_uint(&mut self) -> Result<u32> {
        let first_byte = self.read_le::<u8>()?;

        // 1-byte encoding: 0xxxxxxx
        if (first_byte & 0x80) == 0 {
            return Ok(u32::from(first_byte));
        }

        // 2-byte encoding: 10xxxxxx xxxxxxxx
        if (first_byte & 0xC0) == 0x80 {
            let second_byte = self.read_le::<u8>()?;
            return Ok(((u32::from(first_byte) & 0x3F) << 8) | u32::from(second_byte));
        }

        // 4-byte encoding: 110xxxxx xxxxxxxx xxxxxxxx xxxxxxxx
        if (first_byte & 0xE0) == 0xC0 {
            let rest = self.read_bytes(3)?;
            return Ok(((u32::from(first_byte) & 0x1F) << 24)
                | (u32::from(rest[0]) << 16)
                | (u32::from(rest[1]) << 8)
                | u32::from(rest[2]));
        }

        Err(malformed_error!(
            "Invalid compressed uint at offset {} - 0x{:02X}",
            self.position - 1,
            first_byte
        ))
    }

    /// Read an ECMA-335 compressed signed integer (II.23.2).
    ///
    /// The length is detected exactly like [`Parser::read_compressed_uint`]. The least
    /// significant bit of the decoded value is the sign; the remaining 6, 13 or 28 bits are
    /// the two's-complement payload, which is shifted down and sign-extended.
    ///
    /// # Errors
    /// Same as [`Parser::read_compressed_uint`].
    pub fn read_compressed_int(&mut self) -> Result<i32> {
        let start = self.position;
        let raw = self.read_compressed_uint()?;
        let payload_bits = match self.position - start {
            1 => 6,
            2 => 13,
            _ => 28,
        };

        let magnitude = raw >> 1;
        let value = if raw & 1 == 0 {
            magnitude
        } else {
            magnitude | (u32::MAX << payload_bits)
        };

        #[allow(clippy::cast_possible_wrap)]
        let signed = value as i32;
        Ok(signed)
    }

    /// Read a compressed `TypeDefOrRefOrSpecEncoded` token (II.23.2.8).
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the tag selects no table.
    pub fn read_compressed_token(&mut self) -> Result<Token> {
        let compressed_token = self.read_compressed_uint()?;
        let table: u32 = match compressed_token & 0x3 {
            0x0 => 0x0200_0000, // TypeDef
            0x1 => 0x0100_0000, // TypeRef
            0x2 => 0x1B00_0000, // TypeSpec
            _ => {
                return Err(malformed_error!(
                    "Invalid compressed token - 0x{:08X}",
                    compressed_token
                ))
            }
        };

        Ok(Token::new(table | (compressed_token >> 2)))
    }

    /// Read a `SerString` as used by custom attribute blobs (II.23.3).
    ///
    /// A leading `0xFF` encodes the null string and yields `None`.
    ///
    /// # Errors
    /// Returns an error for truncated data or invalid UTF-8.
    pub fn read_ser_string(&mut self) -> Result<Option<String>> {
        if self.consume_if(0xFF) {
            return Ok(None);
        }

        let length = self.read_compressed_uint()? as usize;
        let start = self.position;
        let bytes = self.read_bytes(length)?;
        match std::str::from_utf8(bytes) {
            Ok(value) => Ok(Some(value.to_string())),
            Err(error) => Err(malformed_error!(
                "Invalid UTF-8 string at offset {}-{}: {}",
                start,
                start + length,
                error
            )),
        }
    }
}
