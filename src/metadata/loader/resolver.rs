use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    metadata::{
        identity::{AssemblyFlags, AssemblyIdentity},
        modulefile::ModuleFile,
    },
    Error, Result,
};

/// Supplies the module of an assembly the load context does not have yet.
///
/// Implemented for every `Fn(&AssemblyIdentity, AssemblyFlags) -> Result<ModuleFile>`, so a
/// closure is enough for most callers. A resolver that cannot find the assembly should return
/// [`Error::AssemblyNotFound`]; other errors are wrapped into one by the context.
pub trait AssemblyResolver: Send + Sync {
    /// Provide the module for `identity`, referenced with `flags`.
    ///
    /// # Errors
    /// Returns an error if the assembly cannot be found or read.
    fn resolve(&self, identity: &AssemblyIdentity, flags: AssemblyFlags) -> Result<ModuleFile>;
}

impl<F> AssemblyResolver for F
where
    F: Fn(&AssemblyIdentity, AssemblyFlags) -> Result<ModuleFile> + Send + Sync,
{
    fn resolve(&self, identity: &AssemblyIdentity, flags: AssemblyFlags) -> Result<ModuleFile> {
        self(identity, flags)
    }
}

enum CoreLibrarySource {
    File(PathBuf),
    Bytes(Arc<[u8]>),
}

/// A resolver that answers requests for the core library (`mscorlib`, `System.Runtime`,
/// `netstandard`, `System.Private.CoreLib`) with a fixed module when `inner` cannot.
///
/// All four names resolve to the same module; the load context recognises the duplicates by
/// identity and keeps a single assembly.
pub struct CoreLibraryFallback<R> {
    core: CoreLibrarySource,
    inner: R,
}

impl<R: AssemblyResolver> CoreLibraryFallback<R> {
    /// Fall back to the core library at `path`.
    pub fn from_file(path: impl AsRef<Path>, inner: R) -> Self {
        CoreLibraryFallback {
            core: CoreLibrarySource::File(path.as_ref().to_path_buf()),
            inner,
        }
    }

    /// Fall back to the core library image `data`.
    pub fn from_mem(data: Vec<u8>, inner: R) -> Self {
        CoreLibraryFallback {
            core: CoreLibrarySource::Bytes(Arc::from(data)),
            inner,
        }
    }

    fn load_core(&self) -> Result<ModuleFile> {
        match &self.core {
            CoreLibrarySource::File(path) => ModuleFile::from_file(path),
            CoreLibrarySource::Bytes(data) => ModuleFile::from_mem(data.to_vec()),
        }
    }
}

impl<R: AssemblyResolver> AssemblyResolver for CoreLibraryFallback<R> {
    fn resolve(&self, identity: &AssemblyIdentity, flags: AssemblyFlags) -> Result<ModuleFile> {
        match self.inner.resolve(identity, flags) {
            Ok(module) => Ok(module),
            Err(error) if identity.is_core_library() => {
                log::debug!("Using the fallback core library for {} ({})", identity, error);
                self.load_core()
            }
            Err(error) => Err(error),
        }
    }
}

/// A resolver that never finds anything; for contexts whose assemblies are all loaded
/// explicitly.
pub(crate) fn no_resolver(identity: &AssemblyIdentity, _flags: AssemblyFlags) -> Result<ModuleFile> {
    Err(Error::AssemblyNotFound {
        identity: identity.to_string(),
        reason: "no resolver configured".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{metadata::identity::AssemblyVersion, test::MetadataBuilder};

    #[test]
    fn fallback_only_for_core_library() {
        let core = MetadataBuilder::new("System.Private.CoreLib").build();
        let resolver = CoreLibraryFallback::from_mem(core, no_resolver);

        let runtime = AssemblyIdentity::new("System.Runtime", AssemblyVersion::new(8, 0, 0, 0));
        let module = resolver.resolve(&runtime, AssemblyFlags::empty()).unwrap();
        assert_eq!(module.module_name().unwrap(), "System.Private.CoreLib.dll");

        let other = AssemblyIdentity::new("Other", AssemblyVersion::new(1, 0, 0, 0));
        assert!(matches!(
            resolver.resolve(&other, AssemblyFlags::empty()),
            Err(Error::AssemblyNotFound { .. })
        ));
    }

    #[test]
    fn inner_takes_precedence() {
        let resolver = CoreLibraryFallback::from_mem(
            MetadataBuilder::new("mscorlib").build(),
            |_: &AssemblyIdentity, _: AssemblyFlags| {
                ModuleFile::from_mem(MetadataBuilder::new("netstandard").build())
            },
        );

        let identity = AssemblyIdentity::new("netstandard", AssemblyVersion::new(2, 0, 0, 0));
        let module = resolver.resolve(&identity, AssemblyFlags::empty()).unwrap();
        assert_eq!(module.module_name().unwrap(), "netstandard.dll");
    }
}
