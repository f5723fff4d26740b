use std::fmt;

use crate::{
    file::parser::Parser,
    metadata::{signatures::ELEMENT_TYPE, streams::utf16_from_le_bytes},
    Result,
};

/// A compile-time constant from the `Constant` table: the value of a literal field, or the
/// default value of a parameter or property.
#[derive(Debug, Clone, PartialEq)]
#[allow(missing_docs)]
pub enum Constant {
    Boolean(bool),
    /// A UTF-16 code unit
    Char(u16),
    I1(i8),
    U1(u8),
    I2(i16),
    U2(u16),
    I4(i32),
    U4(u32),
    I8(i64),
    U8(u64),
    R4(f32),
    R8(f64),
    String(String),
    /// The null reference, stored as a `CLASS` constant
    Null,
}

impl Constant {
    /// Decode a constant of element type `element_type` from its value blob.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] for an element type constants cannot have or a
    /// blob of the wrong size.
    pub fn decode(element_type: u8, blob: &[u8]) -> Result<Constant> {
        let mut parser = Parser::new(blob);
        let constant = match element_type {
            ELEMENT_TYPE::BOOLEAN => Constant::Boolean(parser.read_le::<u8>()? != 0),
            ELEMENT_TYPE::CHAR => Constant::Char(parser.read_le()?),
            ELEMENT_TYPE::I1 => Constant::I1(parser.read_le()?),
            ELEMENT_TYPE::U1 => Constant::U1(parser.read_le()?),
            ELEMENT_TYPE::I2 => Constant::I2(parser.read_le()?),
            ELEMENT_TYPE::U2 => Constant::U2(parser.read_le()?),
            ELEMENT_TYPE::I4 => Constant::I4(parser.read_le()?),
            ELEMENT_TYPE::U4 => Constant::U4(parser.read_le()?),
            ELEMENT_TYPE::I8 => Constant::I8(parser.read_le()?),
            ELEMENT_TYPE::U8 => Constant::U8(parser.read_le()?),
            ELEMENT_TYPE::R4 => Constant::R4(parser.read_le()?),
            ELEMENT_TYPE::R8 => Constant::R8(parser.read_le()?),
            ELEMENT_TYPE::STRING => {
                if blob.len() % 2 != 0 {
                    return Err(malformed_error!(
                        "String constant of odd length {}",
                        blob.len()
                    ));
                }
                return Ok(Constant::String(utf16_from_le_bytes(blob).to_string_lossy()));
            }
            ELEMENT_TYPE::CLASS => {
                if parser.read_le::<u32>()? != 0 {
                    return Err(malformed_error!("Class constant with a non-null value"));
                }
                Constant::Null
            }
            _ => {
                return Err(malformed_error!(
                    "Invalid constant element type {:#04x}",
                    element_type
                ))
            }
        };

        if parser.has_more_data() {
            return Err(malformed_error!(
                "Constant of type {:#04x} has {} trailing bytes",
                element_type,
                parser.remaining()
            ));
        }

        Ok(constant)
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Boolean(value) => write!(f, "{value}"),
            Constant::Char(value) => match char::from_u32(u32::from(*value)) {
                Some(c) => write!(f, "'{c}'"),
                None => write!(f, "'\\u{value:04x}'"),
            },
            Constant::I1(value) => write!(f, "{value}"),
            Constant::U1(value) => write!(f, "{value}"),
            Constant::I2(value) => write!(f, "{value}"),
            Constant::U2(value) => write!(f, "{value}"),
            Constant::I4(value) => write!(f, "{value}"),
            Constant::U4(value) => write!(f, "{value}"),
            Constant::I8(value) => write!(f, "{value}"),
            Constant::U8(value) => write!(f, "{value}"),
            Constant::R4(value) => write!(f, "{value}"),
            Constant::R8(value) => write!(f, "{value}"),
            Constant::String(value) => write!(f, "{value:?}"),
            Constant::Null => f.write_str("null"),
        }
    }
}
