//! Fixtures shared by the unit tests.


use std::sync::Arc;

pub use builder::{stub_core_library, wrap_in_pe, MetadataBuilder};

use crate::metadata::{
    assembly::Assembly,
    loader::{no_resolver, AssemblyLoadContext, CoreLibraryFallback},
};

/// A context whose core library requests are answered by [`stub_core_library`], with the
/// stub already loaded.
pub fn context_with_core_library() -> AssemblyLoadContext {
    let context = AssemblyLoadContext::new(CoreLibraryFallback::from_mem(
        stub_core_library(),
        no_resolver,
    ));
    context.load_mem(stub_core_library()).unwrap();
    context
}

/// Load `builder`'s image into a fresh [`context_with_core_library`].
///
/// The context is returned with the assembly; assemblies only hold it weakly.
pub fn load(builder: &MetadataBuilder) -> (AssemblyLoadContext, Arc<Assembly>) {
    let context = context_with_core_library();
    let assembly = context.load_mem(builder.build()).unwrap();
    (context, assembly)
}
