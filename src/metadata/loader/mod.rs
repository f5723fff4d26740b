//! Loading assemblies and resolving the references between them.
//!
//! An [`AssemblyLoadContext`] owns every [`crate::Assembly`] loaded into it, keyed by
//! [`crate::AssemblyIdentity`]. Assemblies are loaded explicitly from a file or buffer, or
//! implicitly when an entity of one assembly refers to a type of another: the `AssemblyRef`
//! row is then handed to the context's [`AssemblyResolver`], which supplies the module.
//!
//! Each identity is loaded and decoded once per context. Resolution that re-enters an
//! identity still being resolved on the same thread fails with
//! [`crate::Error::ReferenceCycle`] instead of recursing.
//!
//! # Example
//!
//! ```rust,no_run
//! use dotmeta::prelude::*;
//!
//! let resolver = CoreLibraryFallback::from_file(
//!     "/usr/share/dotnet/shared/Microsoft.NETCore.App/8.0.0/System.Private.CoreLib.dll",
//!     |identity: &AssemblyIdentity, _: AssemblyFlags| {
//!         ModuleFile::from_file(format!("lib/{}.dll", identity.name).as_ref())
//!     },
//! );
//!
//! let context = AssemblyLoadContext::new(resolver);
//! let assembly = context.load_file("lib/App.dll".as_ref())?;
//! let core = assembly.core_library()?;
//! println!("{} builds on {}", assembly.identity(), core.identity());
//! # Ok::<(), dotmeta::Error>(())
//! ```

mod context;
mod resolver;

pub use context::AssemblyLoadContext;
pub(crate) use context::ContextInner;
pub(crate) use resolver::no_resolver;
pub use resolver::{AssemblyResolver, CoreLibraryFallback};
