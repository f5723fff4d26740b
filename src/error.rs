use thiserror::Error;

/// Helper macro for creating malformed data errors with source location information.
///
/// The location of the `malformed_error!` call site is recorded, which makes it possible to
/// tell which decoder rejected the input without a debugger.
///
/// # Examples
///
/// ```rust,ignore
/// return Err(malformed_error!("Invalid coded index tag - {}", tag));
/// ```
macro_rules! malformed_error {
    // Single string version
    ($msg:expr) => {
        crate::Error::Malformed {
            message: $msg.to_string(),
            file: file!(),
            line: line!(),
        }
    };

    // Format string with arguments version
    ($fmt:expr, $($arg:tt)*) => {
        crate::Error::Malformed {
            message: format!($fmt, $($arg)*),
            file: file!(),
            line: line!(),
        }
    };
}

/// Helper macro for creating out-of-bounds errors with source location information.
macro_rules! out_of_bounds_error {
    () => {
        crate::Error::OutOfBounds {
            file: file!(),
            line: line!(),
        }
    };
}

/// The generic Error type, which provides coverage for all errors this library can potentially
/// return.
///
/// # Error Categories
///
/// ## Format Errors
/// Malformed or internally inconsistent metadata. These are always recoverable and carry the
/// location of the decoder that rejected the input.
/// - [`Error::Malformed`] - Corrupted or invalid structure (bad header, bad coded index, bad blob)
/// - [`Error::OutOfBounds`] - Attempted to read beyond the end of a buffer
/// - [`Error::RecursionLimit`] - Signature nesting deeper than the decoder allows
/// - [`Error::NotSupported`] - Valid input using a feature this crate does not decode
/// - [`Error::Empty`] - Empty input provided
///
/// ## I/O and External Errors
/// - [`Error::FileError`] - Filesystem I/O errors
/// - [`Error::GoblinErr`] - PE parsing errors from the goblin crate
///
/// ## Load Errors
/// - [`Error::AssemblyNotFound`] - The resolver could not provide a referenced assembly
/// - [`Error::ReferenceCycle`] - Resolving an assembly re-entered its own resolution
/// - [`Error::TypeNotFound`] - A type reference names a type its scope does not define
///
/// ## Programmer Errors
/// - [`Error::GenericArityMismatch`] - Generic binding with the wrong number of arguments
/// - [`Error::EntityDropped`] - A handle outlived the load context that owns its entity
/// - [`Error::LockError`] - Thread synchronization failure
///
/// # Examples
///
/// ```rust,no_run
/// use dotmeta::{Error, ModuleFile};
/// use std::path::Path;
///
/// match ModuleFile::from_file(Path::new("assembly.dll")) {
///     Ok(_) => println!("Successfully loaded module"),
///     Err(Error::Malformed { message, file, line }) => {
///         eprintln!("Malformed file: {} ({}:{})", message, file, line);
///     }
///     Err(Error::FileError(io_err)) => eprintln!("I/O error: {}", io_err),
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// ```
#[derive(Error, Debug)]
pub enum Error {
    // Format errors
    /// The metadata is damaged and could not be parsed.
    ///
    /// # Fields
    ///
    /// * `message` - Detailed description of what was malformed
    /// * `file` - Source file where the error was detected
    /// * `line` - Source line where the error was detected
    #[error("Malformed - {file}:{line}: {message}")]
    Malformed {
        /// The message to be printed for the Malformed error
        message: String,
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// An out of bound access was attempted while parsing.
    #[error("Out of Bound read would have occurred - {file}:{line}")]
    OutOfBounds {
        /// The source file in which this error occured
        file: &'static str,
        /// The source line in which this error occured
        line: u32,
    },

    /// This input is valid but uses a feature that is not supported.
    #[error("This file type is not supported")]
    NotSupported,

    /// Provided input was empty.
    #[error("Provided input was empty")]
    Empty,

    /// Recursion limit reached while decoding a signature.
    ///
    /// The associated value shows the recursion limit that was reached.
    #[error("Reach the maximum recursion level allowed - {0}")]
    RecursionLimit(usize),

    // External errors
    /// File I/O error.
    #[error("{0}")]
    FileError(#[from] std::io::Error),

    /// Error from the goblin crate during PE parsing.
    #[error("{0}")]
    GoblinErr(#[from] goblin::error::Error),

    // Load errors
    /// An assembly reference could not be resolved.
    ///
    /// The display name of the missing assembly is always included, together with the
    /// reason the resolver gave.
    #[error("Could not load assembly '{identity}': {reason}")]
    AssemblyNotFound {
        /// Display name of the identity that was requested
        identity: String,
        /// Why the resolver failed
        reason: String,
    },

    /// Resolving an assembly re-entered the resolution of an assembly that is still loading.
    ///
    /// The associated value lists the chain of identities, outermost first.
    #[error("Assembly reference cycle detected - {0}")]
    ReferenceCycle(String),

    /// A type reference could not be found in the assembly it points to.
    #[error("Failed to find type '{0}'")]
    TypeNotFound(String),

    // Programmer errors
    /// Generic arguments were bound against a definition with a different arity.
    #[error("Generic arity mismatch - expected {expected} arguments, got {actual}")]
    GenericArityMismatch {
        /// The declared generic arity
        expected: usize,
        /// The number of arguments supplied
        actual: usize,
    },

    /// A non-owning handle was used after the load context owning its entity was dropped.
    #[error("The entity behind this handle has been dropped")]
    EntityDropped,

    /// Failed to lock target.
    #[error("Failed to lock target")]
    LockError,
}
