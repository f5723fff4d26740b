//! Signature blobs (ECMA-335 II.23.2).
//!
//! Field, method and property rows reference a blob in `#Blob` that describes the shape of the
//! member in a compact recursive grammar. This module decodes those blobs into trees of
//! [`TypeSignature`] and encodes them back.
//!
//! Every `read_*` entry point requires the blob to be consumed exactly; trailing bytes after a
//! complete signature are a format error. Tokens inside signatures are kept as raw
//! `TypeDef`/`TypeRef`/`TypeSpec` tokens; resolving them is the job of the binding layer.
//!
//! # Examples
//!
//! ```rust
//! use dotmeta::metadata::signatures::{read_method_def, TypeSignature};
//!
//! // instance string M(int32)
//! let method = read_method_def(&[0x20, 0x01, 0x0E, 0x08])?;
//! assert!(method.has_this);
//! assert_eq!(method.return_type.base, TypeSignature::String);
//! assert_eq!(method.params[0].base, TypeSignature::I4);
//!
//! // one trailing byte too many
//! assert!(read_method_def(&[0x20, 0x01, 0x0E, 0x08, 0x00]).is_err());
//! # Ok::<(), dotmeta::Error>(())
//! ```
//!
//! # References
//!
//! - ECMA-335 6th Edition, Partition II, Section 23.2 - Blobs and Signatures

pub mod encoder;
mod parser;
mod types;

pub use parser::*;
pub use types::*;

use crate::Result;

/// Run `parse` over `data` and require that it consumes every byte.
fn read_exact<'a, T>(
    data: &'a [u8],
    parse: impl FnOnce(&mut SignatureParser<'a>) -> Result<T>,
) -> Result<T> {
    let mut parser = SignatureParser::new(data);
    let result = parse(&mut parser)?;
    parser.finish()?;
    Ok(result)
}

/// Decode a blob holding exactly one type.
///
/// # Errors
/// Returns an error if the type is malformed or followed by trailing bytes.
pub fn read_type(data: &[u8]) -> Result<TypeSignature> {
    read_exact(data, SignatureParser::parse_type)
}

/// Decode a `FieldSig` blob.
///
/// # Errors
/// Returns an error if the signature is malformed or followed by trailing bytes.
pub fn read_field(data: &[u8]) -> Result<SignatureField> {
    read_exact(data, SignatureParser::parse_field_signature)
}

/// Decode a `MethodDefSig` or `MethodRefSig` blob.
///
/// # Errors
/// Returns an error if the signature is malformed or followed by trailing bytes.
pub fn read_method_def(data: &[u8]) -> Result<SignatureMethod> {
    read_exact(data, SignatureParser::parse_method_signature)
}

/// Decode a `PropertySig` blob.
///
/// # Errors
/// Returns an error if the signature is malformed or followed by trailing bytes.
pub fn read_property(data: &[u8]) -> Result<SignatureProperty> {
    read_exact(data, SignatureParser::parse_property_signature)
}

/// Decode a `TypeSpec` blob.
///
/// # Errors
/// Returns an error if the type is malformed or followed by trailing bytes.
pub fn read_type_spec(data: &[u8]) -> Result<SignatureTypeSpec> {
    read_exact(data, SignatureParser::parse_type_spec_signature)
}

/// Decode a `MethodSpec` blob.
///
/// # Errors
/// Returns an error if the signature is malformed or followed by trailing bytes.
pub fn read_method_spec(data: &[u8]) -> Result<SignatureMethodSpec> {
    read_exact(data, SignatureParser::parse_method_spec_signature)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_consumption() {
        assert_eq!(read_type(&[0x08]).unwrap(), TypeSignature::I4);
        assert!(read_type(&[0x08, 0x08]).is_err());
        assert!(read_type(&[]).is_err());

        assert!(read_field(&[0x06, 0x0E]).is_ok());
        assert!(read_field(&[0x06, 0x0E, 0x00]).is_err());

        assert!(read_method_def(&[0x00, 0x00, 0x01]).is_ok());
        assert!(read_method_def(&[0x00, 0x00, 0x01, 0x01]).is_err());

        assert!(read_property(&[0x08, 0x00, 0x08]).is_ok());
        assert!(read_property(&[0x08, 0x00, 0x08, 0xFF]).is_err());

        assert!(read_type_spec(&[0x1D, 0x08]).is_ok());
        assert!(read_type_spec(&[0x1D, 0x08, 0x08]).is_err());

        assert!(read_method_spec(&[0x0A, 0x01, 0x08]).is_ok());
        assert!(read_method_spec(&[0x0A, 0x01, 0x08, 0x08]).is_err());
    }

    #[test]
    fn truncated_is_not_partial() {
        // every strict prefix of a valid blob fails
        let blob = [0x20, 0x02, 0x15, 0x12, 0x2A, 0x01, 0x0E, 0x10, 0x08, 0x1D, 0x0E];
        assert!(read_method_def(&blob).is_ok());
        for end in 0..blob.len() {
            assert!(read_method_def(&blob[..end]).is_err(), "prefix {}", end);
        }
    }
}
