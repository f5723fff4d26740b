//! ECMA-335 metadata of .NET assemblies.
//!
//! The module is layered bottom-up:
//!
//! - [`cor20header`] and [`root`] locate the metadata inside an image
//! - [`streams`] decodes the heaps and the table stream header
//! - [`tables`] gives typed, random-access views of the rows of every table
//! - [`signatures`] parses and writes the blob grammar of fields, methods and types
//! - [`modulefile`] ties the physical layer of one file together
//! - [`typesystem`] and [`members`] bind rows into a navigable graph of definitions
//! - [`assembly`] and [`loader`] own that graph and resolve references across assemblies
//!
//! # Examples
//!
//! ```rust,no_run
//! use dotmeta::metadata::{modulefile::ModuleFile, tables::TypeDefRaw};
//!
//! let module = ModuleFile::from_file("tests/samples/Library.dll".as_ref())?;
//! if let Some(types) = module.table::<TypeDefRaw>() {
//!     for row in types.iter() {
//!         let row = row?;
//!         println!("{}.{}", module.string(row.type_namespace)?, module.string(row.type_name)?);
//!     }
//! }
//! # Ok::<(), dotmeta::Error>(())
//! ```

/// A loaded assembly, owner of its logical entities
pub mod assembly;
/// The CLI header of a PE image
pub mod cor20header;
/// Assembly names, versions and public key tokens
pub mod identity;
/// Assembly load context and reference resolvers
pub mod loader;
/// Fields, methods, properties, events, parameters and custom attributes
pub mod members;
/// The physical layer of a single metadata module
pub mod modulefile;
/// The metadata root and its stream directory
pub mod root;
/// Signature blob decoder and encoder
pub mod signatures;
/// Metadata heaps and the table stream
pub mod streams;
/// Row views of the metadata tables
pub mod tables;
/// Metadata tokens
pub mod token;
/// Type definitions, bound types and generic parameters
pub mod typesystem;
