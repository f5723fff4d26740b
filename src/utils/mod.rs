//! Internal helpers shared across the crate.

mod compression;
mod synchronization;

pub use compression::{write_compressed_int, write_compressed_uint, MAX_COMPRESSED_UINT};
pub use synchronization::Memo;
