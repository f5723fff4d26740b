//! Writers for the compressed integer encodings of II.23.2.
//!
//! The readers live on [`crate::file::parser::Parser`]; these produce the canonical, shortest
//! form a conforming compiler emits.

use crate::Result;

/// Largest value a compressed unsigned integer can hold (29 bits).
pub const MAX_COMPRESSED_UINT: u32 = 0x1FFF_FFFF;

/// Append `value` as a compressed unsigned integer in its shortest form.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if `value` exceeds [`MAX_COMPRESSED_UINT`].
pub fn write_compressed_uint(value: u32, buffer: &mut Vec<u8>) -> Result<()> {
    if value <= 0x7F {
        buffer.push(value as u8);
    } else if value <= 0x3FFF {
        buffer.push(0x80 | (value >> 8) as u8);
        buffer.push(value as u8);
    } else if value <= MAX_COMPRESSED_UINT {
        buffer.push(0xC0 | (value >> 24) as u8);
        buffer.push((value >> 16) as u8);
        buffer.push((value >> 8) as u8);
        buffer.push(value as u8);
    } else {
        return Err(malformed_error!(
            "Value 0x{:X} does not fit into a compressed integer",
            value
        ));
    }

    Ok(())
}

/// Append `value` as a compressed signed integer in its shortest form.
///
/// The two's-complement value is truncated to 6, 13 or 28 payload bits, rotated left by one
/// and the sign placed in bit 0.
///
/// # Errors
/// Returns [`crate::Error::Malformed`] if `value` needs more than 28 payload bits.
#[allow(clippy::cast_sign_loss)]
pub fn write_compressed_int(value: i32, buffer: &mut Vec<u8>) -> Result<()> {
    let sign = u32::from(value < 0);
    let (payload_bits, encoded_bits): (u32, u32) = if (-0x40..0x40).contains(&value) {
        (6, 7)
    } else if (-0x2000..0x2000).contains(&value) {
        (13, 14)
    } else if (-0x1000_0000..0x1000_0000).contains(&value) {
        (28, 29)
    } else {
        return Err(malformed_error!(
            "Value {} does not fit into a compressed signed integer",
            value
        ));
    };

    let payload = (value as u32) & ((1 << payload_bits) - 1);
    let encoded = (payload << 1) | sign;
    match encoded_bits {
        7 => buffer.push(encoded as u8),
        14 => {
            buffer.push(0x80 | (encoded >> 8) as u8);
            buffer.push(encoded as u8);
        }
        _ => {
            buffer.push(0xC0 | (encoded >> 24) as u8);
            buffer.push((encoded >> 16) as u8);
            buffer.push((encoded >> 8) as u8);
            buffer.push(encoded as u8);
        }
    }

    Ok(())
}
