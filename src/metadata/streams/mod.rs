//! Metadata streams (ECMA-335 II.24.2.2).
//!
//! The metadata root is followed by up to five named streams:
//!
//! - **`#~`** / **`#-`** - the table stream, see [`TablesHeader`]
//! - **`#Strings`** - NUL-terminated UTF-8 identifiers, see [`Strings`]
//! - **`#Blob`** - length-prefixed binary data such as signatures, see [`Blob`]
//! - **`#GUID`** - 16-byte GUIDs addressed by a 1-based index, see [`Guid`]
//! - **`#US`** - length-prefixed UTF-16 string literals, see [`UserStrings`]
//!
//! All heap views borrow the file bytes and resolve indices on demand.

mod blob;
mod guid;
mod streamheader;
mod strings;
mod tablesheader;
mod userstrings;

pub use blob::{Blob, BlobIterator};
pub use guid::Guid;
pub use streamheader::StreamHeader;
pub use strings::Strings;
pub use tablesheader::{ChildList, TablesHeader};
pub use userstrings::UserStrings;
pub(crate) use userstrings::utf16_from_le_bytes;
