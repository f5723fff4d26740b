//! Encoders producing the canonical blob form of decoded signatures.
//!
//! Decoding followed by encoding reproduces the input byte for byte for every blob a
//! conforming compiler emits: compressed integers are always written in their shortest form,
//! and tokens as `TypeDefOrRefOrSpecEncoded`.

use crate::{
    metadata::{
        signatures::{
            CustomModifier, SignatureField, SignatureMethod, SignatureMethodSpec,
            SignatureParameter, SignatureProperty, SignatureTypeSpec, TypeSignature,
            ELEMENT_TYPE, SIGNATURE_HEADER,
        },
        token::Token,
    },
    utils::write_compressed_int,
    Result,
};

pub use crate::utils::write_compressed_uint;

/// Encode a token as `TypeDefOrRefOrSpecEncoded` (II.23.2.8).
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if the token is not a `TypeDef`, `TypeRef` or `TypeSpec`.
pub fn encode_type_def_or_ref(token: Token, buffer: &mut Vec<u8>) -> Result<()> {
    let tag = match token.table() {
        0x02 => 0,
        0x01 => 1,
        0x1B => 2,
        _ => {
            return Err(malformed_error!(
                "Token {} can not be encoded as TypeDefOrRefOrSpec",
                token
            ))
        }
    };

    write_compressed_uint((token.row() << 2) | tag, buffer)
}

fn encode_custom_modifiers(modifiers: &[CustomModifier], buffer: &mut Vec<u8>) -> Result<()> {
    for modifier in modifiers {
        buffer.push(if modifier.is_required {
            ELEMENT_TYPE::CMOD_REQD
        } else {
            ELEMENT_TYPE::CMOD_OPT
        });
        encode_type_def_or_ref(modifier.modifier_type, buffer)?;
    }

    Ok(())
}

fn encode_parameter(parameter: &SignatureParameter, buffer: &mut Vec<u8>) -> Result<()> {
    encode_custom_modifiers(&parameter.modifiers, buffer)?;
    if parameter.by_ref {
        buffer.push(ELEMENT_TYPE::BYREF);
    }

    encode_type_into(&parameter.base, buffer)
}

fn count(length: usize) -> Result<u32> {
    u32::try_from(length).map_err(|_| malformed_error!("Count {} is too large", length))
}

/// Append the encoding of a single type.
///
/// On error the buffer is left exactly as it was passed in.
///
/// # Errors
/// Returns an error if a token can not be encoded or a count exceeds the compressed range.
pub fn encode_type(signature: &TypeSignature, buffer: &mut Vec<u8>) -> Result<()> {
    let start = buffer.len();
    let result = encode_type_into(signature, buffer);
    if result.is_err() {
        buffer.truncate(start);
    }

    result
}

fn encode_type_into(signature: &TypeSignature, buffer: &mut Vec<u8>) -> Result<()> {
    match signature {
        TypeSignature::Void => buffer.push(ELEMENT_TYPE::VOID),
        TypeSignature::Boolean => buffer.push(ELEMENT_TYPE::BOOLEAN),
        TypeSignature::Char => buffer.push(ELEMENT_TYPE::CHAR),
        TypeSignature::I1 => buffer.push(ELEMENT_TYPE::I1),
        TypeSignature::U1 => buffer.push(ELEMENT_TYPE::U1),
        TypeSignature::I2 => buffer.push(ELEMENT_TYPE::I2),
        TypeSignature::U2 => buffer.push(ELEMENT_TYPE::U2),
        TypeSignature::I4 => buffer.push(ELEMENT_TYPE::I4),
        TypeSignature::U4 => buffer.push(ELEMENT_TYPE::U4),
        TypeSignature::I8 => buffer.push(ELEMENT_TYPE::I8),
        TypeSignature::U8 => buffer.push(ELEMENT_TYPE::U8),
        TypeSignature::R4 => buffer.push(ELEMENT_TYPE::R4),
        TypeSignature::R8 => buffer.push(ELEMENT_TYPE::R8),
        TypeSignature::String => buffer.push(ELEMENT_TYPE::STRING),
        TypeSignature::Object => buffer.push(ELEMENT_TYPE::OBJECT),
        TypeSignature::I => buffer.push(ELEMENT_TYPE::I),
        TypeSignature::U => buffer.push(ELEMENT_TYPE::U),
        TypeSignature::TypedByRef => buffer.push(ELEMENT_TYPE::TYPEDBYREF),
        TypeSignature::Ptr(pointer) => {
            buffer.push(ELEMENT_TYPE::PTR);
            encode_custom_modifiers(&pointer.modifiers, buffer)?;
            encode_type_into(&pointer.base, buffer)?;
        }
        TypeSignature::ByRef(inner) => {
            buffer.push(ELEMENT_TYPE::BYREF);
            encode_type_into(inner, buffer)?;
        }
        TypeSignature::ValueType(token) => {
            buffer.push(ELEMENT_TYPE::VALUETYPE);
            encode_type_def_or_ref(*token, buffer)?;
        }
        TypeSignature::Class(token) => {
            buffer.push(ELEMENT_TYPE::CLASS);
            encode_type_def_or_ref(*token, buffer)?;
        }
        TypeSignature::GenericParamType(index) => {
            buffer.push(ELEMENT_TYPE::VAR);
            write_compressed_uint(*index, buffer)?;
        }
        TypeSignature::GenericParamMethod(index) => {
            buffer.push(ELEMENT_TYPE::MVAR);
            write_compressed_uint(*index, buffer)?;
        }
        TypeSignature::Array(array) => {
            buffer.push(ELEMENT_TYPE::ARRAY);
            encode_type_into(&array.base, buffer)?;
            write_compressed_uint(array.rank, buffer)?;

            let sizes: Vec<u32> = array
                .dimensions
                .iter()
                .map_while(|dimension| dimension.size)
                .collect();
            write_compressed_uint(count(sizes.len())?, buffer)?;
            for size in sizes {
                write_compressed_uint(size, buffer)?;
            }

            let lower_bounds: Vec<i32> = array
                .dimensions
                .iter()
                .map_while(|dimension| dimension.lower_bound)
                .collect();
            write_compressed_uint(count(lower_bounds.len())?, buffer)?;
            for lower_bound in lower_bounds {
                write_compressed_int(lower_bound, buffer)?;
            }
        }
        TypeSignature::SzArray(array) => {
            buffer.push(ELEMENT_TYPE::SZARRAY);
            encode_custom_modifiers(&array.modifiers, buffer)?;
            encode_type_into(&array.base, buffer)?;
        }
        TypeSignature::GenericInst(base, args) => {
            buffer.push(ELEMENT_TYPE::GENERICINST);
            encode_type_into(base, buffer)?;
            write_compressed_uint(count(args.len())?, buffer)?;
            for arg in args {
                encode_type_into(arg, buffer)?;
            }
        }
        TypeSignature::FnPtr(method) => {
            buffer.push(ELEMENT_TYPE::FNPTR);
            encode_method_into(method, buffer)?;
        }
        TypeSignature::Modified(modifiers, inner) => {
            encode_custom_modifiers(modifiers, buffer)?;
            encode_type_into(inner, buffer)?;
        }
    }

    Ok(())
}

fn encode_method_into(signature: &SignatureMethod, buffer: &mut Vec<u8>) -> Result<()> {
    let mut header = signature.calling_convention & SIGNATURE_HEADER::KIND_MASK;
    if signature.has_this {
        header |= SIGNATURE_HEADER::HAS_THIS;
    }
    if signature.explicit_this {
        header |= SIGNATURE_HEADER::EXPLICIT_THIS;
    }
    if signature.generic_param_count > 0 {
        header |= SIGNATURE_HEADER::GENERIC;
    }

    buffer.push(header);
    if signature.generic_param_count > 0 {
        write_compressed_uint(signature.generic_param_count, buffer)?;
    }

    write_compressed_uint(
        count(signature.params.len() + signature.varargs.len())?,
        buffer,
    )?;
    encode_parameter(&signature.return_type, buffer)?;
    for param in &signature.params {
        encode_parameter(param, buffer)?;
    }

    if !signature.varargs.is_empty() {
        buffer.push(ELEMENT_TYPE::SENTINEL);
        for param in &signature.varargs {
            encode_parameter(param, buffer)?;
        }
    }

    Ok(())
}

/// Encode a method signature.
///
/// # Errors
/// Returns an error if a contained type can not be encoded.
pub fn encode_method_signature(signature: &SignatureMethod) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    encode_method_into(signature, &mut buffer)?;
    Ok(buffer)
}

/// Encode a field signature.
///
/// # Errors
/// Returns an error if the field type can not be encoded.
pub fn encode_field_signature(signature: &SignatureField) -> Result<Vec<u8>> {
    let mut buffer = vec![SIGNATURE_HEADER::FIELD];
    encode_custom_modifiers(&signature.modifiers, &mut buffer)?;
    encode_type_into(&signature.base, &mut buffer)?;
    Ok(buffer)
}

/// Encode a property signature.
///
/// # Errors
/// Returns an error if a contained type can not be encoded.
pub fn encode_property_signature(signature: &SignatureProperty) -> Result<Vec<u8>> {
    let mut header = SIGNATURE_HEADER::PROPERTY;
    if signature.has_this {
        header |= SIGNATURE_HEADER::HAS_THIS;
    }

    let mut buffer = vec![header];
    write_compressed_uint(count(signature.params.len())?, &mut buffer)?;
    encode_custom_modifiers(&signature.modifiers, &mut buffer)?;
    encode_type_into(&signature.base, &mut buffer)?;
    for param in &signature.params {
        encode_parameter(param, &mut buffer)?;
    }

    Ok(buffer)
}

/// Encode a `TypeSpec` blob.
///
/// # Errors
/// Returns an error if the type can not be encoded.
pub fn encode_type_spec_signature(signature: &SignatureTypeSpec) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    encode_type_into(&signature.base, &mut buffer)?;
    Ok(buffer)
}

/// Encode a `MethodSpec` blob.
///
/// # Errors
/// Returns an error if an argument can not be encoded.
pub fn encode_method_spec_signature(signature: &SignatureMethodSpec) -> Result<Vec<u8>> {
    let mut buffer = vec![SIGNATURE_HEADER::GENERICINST];
    write_compressed_uint(count(signature.generic_args.len())?, &mut buffer)?;
    for arg in &signature.generic_args {
        encode_type(arg, &mut buffer)?;
    }

    Ok(buffer)
}
