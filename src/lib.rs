// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![allow(dead_code)]
#![allow(clippy::too_many_arguments)]
// - 'file/physical.rs' uses mmap to map a file into memory

//! # dotmeta
//!
//! A lazy, strongly-typed reader for the ECMA-335 CLI metadata embedded in .NET assemblies
//! and Windows Runtime metadata (`.winmd`) files. Nothing in the inspected assembly is ever
//! executed; the crate only decodes the binary tables and heaps and projects them into a
//! navigable object graph.
//!
//! ## Layers
//!
//! - **Physical reader** - [`metadata::root`], [`metadata::streams`] and [`metadata::tables`]
//!   locate the metadata root, decode the heaps and expose random-access row views for all
//!   45 metadata tables, including variable-width columns and coded indices.
//! - **Signature decoder** - [`metadata::signatures`] is a recursive-descent parser for the
//!   blob grammar describing fields, methods, properties and type specifications.
//! - **Binding layer** - [`metadata::typesystem`] and [`metadata::members`] turn rows into
//!   type definitions, members, generic parameters and custom attributes. Every derived
//!   property is computed on first access and memoized.
//! - **Load context** - [`metadata::loader::AssemblyLoadContext`] owns loaded assemblies,
//!   keyed by identity, and resolves cross-assembly references through a caller-supplied
//!   resolver.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use dotmeta::prelude::*;
//!
//! let context = AssemblyLoadContext::new(|identity: &AssemblyIdentity, _flags: AssemblyFlags| {
//!     ModuleFile::from_file(format!("refs/{}.dll", identity.name).as_ref())
//! });
//!
//! let assembly = context.load_file("tests/samples/Library.dll".as_ref())?;
//! if let Some(list) = assembly.resolve_type_definition("System.Collections.Generic.List`1")? {
//!     for method in list.methods()? {
//!         println!("{}", method.name());
//!     }
//! }
//! # Ok::<(), dotmeta::Error>(())
//! ```
//!
//! ## Errors
//!
//! Malformed input never panics: every decoder returns [`Result`] and reports the table,
//! heap or blob that failed. Unresolvable assembly references surface as
//! [`Error::AssemblyNotFound`] naming the missing identity.

#[macro_use]
pub(crate) mod macros;

#[macro_use]
pub(crate) mod error;
pub mod file;
pub(crate) mod utils;

#[cfg(test)]
pub(crate) mod test;

/// Convenient re-exports of the most commonly used types and traits.
pub mod prelude;

/// ECMA-335 metadata: physical tables and heaps, signatures, and the logical type system.
pub mod metadata;

/// `dotmeta` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// `dotmeta` Error type
///
/// The main error type for all operations in this crate.
pub use error::Error;

/// Entry point for loading assemblies and resolving references between them.
pub use metadata::loader::{AssemblyLoadContext, AssemblyResolver, CoreLibraryFallback};

/// A single loaded assembly and its decoded metadata.
pub use metadata::{assembly::Assembly, modulefile::ModuleFile};

/// Identity of an assembly, as used for caching and reference resolution.
pub use metadata::identity::{AssemblyFlags, AssemblyIdentity, AssemblyVersion, PublicKeyToken};

/// Metadata heaps and the table stream.
pub use metadata::streams::{Blob, Guid, StreamHeader, Strings, TablesHeader, UserStrings};

/// Low-level input handling.
pub use file::{parser::Parser, File};
