//! Fixtures shared by the integration tests.
//!
//! The image builder is the one the unit tests use; it names the crate's items through
//! `crate::metadata`, which each test crate re-exports at its root.

#![allow(dead_code)]

#[path = "../../src/test/builder.rs"]
mod builder;

pub use builder::{stub_core_library, wrap_in_pe, MetadataBuilder};

use dotmeta::prelude::*;

/// Type flags: `public class` with `beforefieldinit`.
pub const PUBLIC_CLASS: u32 = 0x0010_0001;

/// Route `log` output of the crate through the test harness.
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// `TypeDef` token of row `rid`.
pub fn type_def(rid: u32) -> Token {
    Token::new(0x0200_0000 | rid)
}

/// A context that serves `images` by assembly name and falls back to a stub core library.
pub fn context_with(images: Vec<(&'static str, Vec<u8>)>) -> AssemblyLoadContext {
    let resolver = move |identity: &AssemblyIdentity, _: AssemblyFlags| {
        match images
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(&identity.name))
        {
            Some((_, data)) => ModuleFile::from_mem(data.clone()),
            None => Err(Error::AssemblyNotFound {
                identity: identity.to_string(),
                reason: "not part of the fixture".to_string(),
            }),
        }
    };
    AssemblyLoadContext::new(CoreLibraryFallback::from_mem(stub_core_library(), resolver))
}
