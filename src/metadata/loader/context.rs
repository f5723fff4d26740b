use std::{
    fmt,
    path::Path,
    sync::{Arc, Mutex, TryLockError},
    thread::{self, ThreadId},
};

use dashmap::{mapref::entry::Entry, DashMap};

use crate::{
    metadata::{
        assembly::Assembly,
        identity::{AssemblyFlags, AssemblyIdentity},
        loader::{no_resolver, AssemblyResolver},
        modulefile::ModuleFile,
    },
    Error, Result,
};

/// Shared state of an [`AssemblyLoadContext`]; assemblies hold a weak reference to it.
pub(crate) struct ContextInner {
    resolver: Box<dyn AssemblyResolver>,
    assemblies: boxcar::Vec<Arc<Assembly>>,
    by_identity: DashMap<AssemblyIdentity, usize>,
    /// Identities each thread is currently resolving, outermost first
    resolving: DashMap<ThreadId, Vec<AssemblyIdentity>>,
    /// One slot per identity being loaded; only the holder of its lock asks the resolver
    loading: DashMap<AssemblyIdentity, Arc<Mutex<()>>>,
    /// The thread holding each loading slot
    owners: DashMap<AssemblyIdentity, ThreadId>,
    /// The identity each blocked thread waits for
    waiting: DashMap<ThreadId, AssemblyIdentity>,
}

/// Pops the innermost identity of the current thread's resolution stack when dropped.
struct ResolvingGuard<'a> {
    context: &'a ContextInner,
    thread: ThreadId,
}

impl Drop for ResolvingGuard<'_> {
    fn drop(&mut self) {
        if let Entry::Occupied(mut entry) = self.context.resolving.entry(self.thread) {
            entry.get_mut().pop();
            if entry.get().is_empty() {
                entry.remove();
            }
        }
    }
}

/// Releases ownership of a loading slot and retires the slot when dropped.
struct LoadingGuard<'a> {
    context: &'a ContextInner,
    identity: &'a AssemblyIdentity,
    slot: &'a Arc<Mutex<()>>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.context.owners.remove(self.identity);
        self.context
            .loading
            .remove_if(self.identity, |_, slot| Arc::ptr_eq(slot, self.slot));
    }
}

/// Clears the waiting mark of a thread when dropped.
struct WaitingGuard<'a> {
    context: &'a ContextInner,
    thread: ThreadId,
}

impl Drop for WaitingGuard<'_> {
    fn drop(&mut self) {
        self.context.waiting.remove(&self.thread);
    }
}

impl ContextInner {
    /// Add `module` to the context, or return the assembly already loaded with its identity.
    /// `alias` is registered as a second key for the result.
    fn add(
        self: &Arc<Self>,
        module: ModuleFile,
        alias: Option<&AssemblyIdentity>,
    ) -> Result<Arc<Assembly>> {
        let assembly = Assembly::load(module, Arc::downgrade(self))?;

        let (index, assembly) = match self.by_identity.entry(assembly.identity().clone()) {
            Entry::Occupied(entry) => {
                let index = *entry.get();
                log::debug!("{} is already loaded", assembly.identity());
                match self.assemblies.get(index) {
                    Some(existing) => (index, Arc::clone(existing)),
                    None => return Err(malformed_error!("Assembly slot {} is empty", index)),
                }
            }
            Entry::Vacant(entry) => {
                let index = self.assemblies.push(Arc::clone(&assembly));
                entry.insert(index);
                (index, assembly)
            }
        };

        if let Some(alias) = alias {
            if alias != assembly.identity() {
                log::debug!("{} resolves to {}", alias, assembly.identity());
                self.by_identity.entry(alias.clone()).or_insert(index);
            }
        }

        Ok(assembly)
    }

    fn cached(&self, identity: &AssemblyIdentity) -> Option<Arc<Assembly>> {
        let index = *self.by_identity.get(identity)?;
        self.assemblies.get(index).cloned()
    }

    /// The assembly `identity` names, asking the resolver if it is not loaded yet.
    pub(crate) fn resolve(
        self: &Arc<Self>,
        identity: &AssemblyIdentity,
        flags: AssemblyFlags,
    ) -> Result<Arc<Assembly>> {
        if let Some(assembly) = self.cached(identity) {
            log::trace!("{} served from cache", identity);
            return Ok(assembly);
        }

        let thread = thread::current().id();
        {
            let mut stack = self.resolving.entry(thread).or_default();
            if stack.contains(identity) {
                let chain = stack
                    .iter()
                    .chain(std::iter::once(identity))
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(" -> ");
                return Err(Error::ReferenceCycle(chain));
            }
            stack.push(identity.clone());
        }
        let _guard = ResolvingGuard {
            context: self,
            thread,
        };

        let slot = Arc::clone(self.loading.entry(identity.clone()).or_default().value());
        let _loading = match slot.try_lock() {
            Ok(lock) => lock,
            Err(TryLockError::WouldBlock) => {
                self.waiting.insert(thread, identity.clone());
                let _waiting = WaitingGuard {
                    context: self,
                    thread,
                };
                if let Some(chain) = self.wait_cycle(identity, thread) {
                    return Err(Error::ReferenceCycle(chain));
                }

                log::debug!("Waiting for {} to be loaded by another thread", identity);
                lock!(slot)
            }
            Err(TryLockError::Poisoned(_)) => return Err(Error::LockError),
        };
        self.owners.insert(identity.clone(), thread);
        let _owner = LoadingGuard {
            context: self,
            identity,
            slot: &slot,
        };

        if let Some(assembly) = self.cached(identity) {
            log::trace!("{} was loaded while waiting", identity);
            return Ok(assembly);
        }

        log::debug!("Resolving {}", identity);
        let module = match self.resolver.resolve(identity, flags) {
            Ok(module) => module,
            Err(error @ (Error::AssemblyNotFound { .. } | Error::ReferenceCycle(_))) => {
                return Err(error)
            }
            Err(error) => {
                return Err(Error::AssemblyNotFound {
                    identity: identity.to_string(),
                    reason: error.to_string(),
                })
            }
        };

        self.add(module, Some(identity))
    }

    /// The chain of loads that would never finish if `thread` blocked on `identity`: the
    /// owner of each slot waits for the next one, and the last is owned by `thread` itself.
    fn wait_cycle(&self, identity: &AssemblyIdentity, thread: ThreadId) -> Option<String> {
        let mut chain = vec![identity.to_string()];
        let mut current = identity.clone();

        for _ in 0..=self.waiting.len() {
            let owner = *self.owners.get(&current)?;
            if owner == thread {
                chain.push(identity.to_string());
                return Some(chain.join(" -> "));
            }
            current = self.waiting.get(&owner)?.value().clone();
            chain.push(current.to_string());
        }

        None
    }

    /// The first core library loaded into the context.
    pub(crate) fn core_library(&self) -> Option<Arc<Assembly>> {
        self.assemblies
            .iter()
            .map(|(_, assembly)| assembly)
            .find(|assembly| assembly.is_core_library())
            .cloned()
    }
}

/// Owner of a set of loaded assemblies and of the resolver that finds their references.
///
/// The context is cheap to clone; clones share the same assemblies. Assemblies and every
/// entity decoded from them are freed when the last clone is dropped; handles that outlive
/// it report [`Error::EntityDropped`].
///
/// # Examples
///
/// ```rust,no_run
/// use dotmeta::prelude::*;
///
/// let context = AssemblyLoadContext::new(|identity: &AssemblyIdentity, _: AssemblyFlags| {
///     ModuleFile::from_file(format!("refs/{}.dll", identity.name).as_ref())
/// });
///
/// let app = context.load_file("App.dll".as_ref())?;
/// for reference in app.references()? {
///     let assembly = context.resolve(&reference, AssemblyFlags::empty())?;
///     println!("{} has {} types", assembly.name(), assembly.types()?.len());
/// }
/// # Ok::<(), dotmeta::Error>(())
/// ```
#[derive(Clone)]
pub struct AssemblyLoadContext {
    inner: Arc<ContextInner>,
}

impl AssemblyLoadContext {
    /// A context that asks `resolver` for assemblies it does not have.
    pub fn new(resolver: impl AssemblyResolver + 'static) -> Self {
        AssemblyLoadContext {
            inner: Arc::new(ContextInner {
                resolver: Box::new(resolver),
                assemblies: boxcar::Vec::new(),
                by_identity: DashMap::new(),
                resolving: DashMap::new(),
                loading: DashMap::new(),
                owners: DashMap::new(),
                waiting: DashMap::new(),
            }),
        }
    }

    /// Load the assembly in the file at `path`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or its metadata is malformed.
    pub fn load_file(&self, path: &Path) -> Result<Arc<Assembly>> {
        self.load_module(ModuleFile::from_file(path)?)
    }

    /// Load the assembly image in `data`.
    ///
    /// # Errors
    /// Returns an error if the metadata is malformed.
    pub fn load_mem(&self, data: Vec<u8>) -> Result<Arc<Assembly>> {
        self.load_module(ModuleFile::from_mem(data)?)
    }

    /// Add an already decoded module. If an assembly with the same identity is loaded, that
    /// one is returned and `module` is dropped.
    ///
    /// # Errors
    /// Returns an error if the `Assembly` row is malformed.
    pub fn load_module(&self, module: ModuleFile) -> Result<Arc<Assembly>> {
        self.inner.add(module, None)
    }

    /// The assembly named by `identity`, loading it through the resolver if needed.
    ///
    /// # Errors
    /// Returns [`Error::AssemblyNotFound`] naming `identity` if the resolver fails, or
    /// [`Error::ReferenceCycle`] if `identity` is already being resolved on this thread.
    pub fn resolve(&self, identity: &AssemblyIdentity, flags: AssemblyFlags) -> Result<Arc<Assembly>> {
        self.inner.resolve(identity, flags)
    }

    /// All loaded assemblies, in load order.
    #[must_use]
    pub fn assemblies(&self) -> Vec<Arc<Assembly>> {
        self.inner
            .assemblies
            .iter()
            .map(|(_, assembly)| Arc::clone(assembly))
            .collect()
    }

    /// The loaded assembly with `identity`, without asking the resolver.
    #[must_use]
    pub fn find(&self, identity: &AssemblyIdentity) -> Option<Arc<Assembly>> {
        self.inner.cached(identity)
    }

    /// The first core library loaded into the context.
    #[must_use]
    pub fn core_library(&self) -> Option<Arc<Assembly>> {
        self.inner.core_library()
    }
}

impl Default for AssemblyLoadContext {
    /// A context without resolver; references resolve only to assemblies loaded explicitly.
    fn default() -> Self {
        AssemblyLoadContext::new(no_resolver)
    }
}

impl fmt::Debug for AssemblyLoadContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AssemblyLoadContext")
            .field("assemblies", &self.inner.assemblies.count())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            atomic::{AtomicUsize, Ordering},
            Barrier, OnceLock,
        },
        time::Duration,
    };

    use super::*;
    use crate::{metadata::identity::AssemblyVersion, test::MetadataBuilder};

    fn identity(name: &str) -> AssemblyIdentity {
        AssemblyIdentity::new(name, AssemblyVersion::new(1, 0, 0, 0))
    }

    #[test]
    fn resolves_once_per_identity() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let context = AssemblyLoadContext::new(move |identity: &AssemblyIdentity, _: AssemblyFlags| {
            counter.fetch_add(1, Ordering::SeqCst);
            ModuleFile::from_mem(MetadataBuilder::new(&identity.name).build())
        });

        let first = context.resolve(&identity("Lib"), AssemblyFlags::empty()).unwrap();
        let second = context.resolve(&identity("LIB"), AssemblyFlags::empty()).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        assert!(context.find(&identity("lib")).is_some());
        assert!(context.find(&identity("Other")).is_none());
        assert_eq!(context.assemblies().len(), 1);
    }

    #[test]
    fn explicit_loads_are_deduplicated() {
        let context = AssemblyLoadContext::default();
        let data = MetadataBuilder::new("Twice").build();
        let first = context.load_mem(data.clone()).unwrap();
        let second = context.load_mem(data).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(context.assemblies().len(), 1);
    }

    #[test]
    fn requested_identity_becomes_alias() {
        let context = AssemblyLoadContext::new(|_: &AssemblyIdentity, _: AssemblyFlags| {
            ModuleFile::from_mem(MetadataBuilder::new("Real").build())
        });

        let alias = identity("Requested");
        let assembly = context.resolve(&alias, AssemblyFlags::empty()).unwrap();
        assert_eq!(assembly.name(), "Real");

        let found = context.find(&alias).unwrap();
        assert!(Arc::ptr_eq(&found, &assembly));
        assert!(Arc::ptr_eq(&context.find(&identity("Real")).unwrap(), &assembly));
    }

    #[test]
    fn missing_assembly() {
        let context = AssemblyLoadContext::default();
        match context.resolve(&identity("Nowhere"), AssemblyFlags::empty()) {
            Err(Error::AssemblyNotFound { identity, .. }) => assert!(identity.starts_with("Nowhere")),
            other => panic!("unexpected {other:?}"),
        }

        let context = AssemblyLoadContext::new(|_: &AssemblyIdentity, _: AssemblyFlags| {
            ModuleFile::from_mem(vec![0; 16])
        });
        assert!(matches!(
            context.resolve(&identity("Broken"), AssemblyFlags::empty()),
            Err(Error::AssemblyNotFound { .. })
        ));
        assert!(context.assemblies().is_empty());
    }

    #[test]
    fn reentrant_resolution_is_a_cycle() {
        let slot: Arc<OnceLock<AssemblyLoadContext>> = Arc::new(OnceLock::new());
        let inner = Arc::clone(&slot);
        let context = AssemblyLoadContext::new(move |identity: &AssemblyIdentity, flags: AssemblyFlags| {
            let Some(context) = inner.get() else {
                return no_resolver(identity, flags);
            };
            let next = if identity.name == "Ping" { "Pong" } else { "Ping" };
            context.resolve(&AssemblyIdentity::new(next, identity.version), flags)?;
            ModuleFile::from_mem(MetadataBuilder::new(&identity.name).build())
        });
        assert!(slot.set(context.clone()).is_ok());

        match context.resolve(&identity("Ping"), AssemblyFlags::empty()) {
            Err(Error::ReferenceCycle(chain)) => {
                assert!(chain.starts_with("Ping"));
                assert!(chain.contains("Pong"));
            }
            other => panic!("unexpected {other:?}"),
        }

        // The resolution stack is unwound after the failure
        assert!(context.inner.resolving.is_empty());
        assert!(context.inner.loading.is_empty());
        assert!(context.assemblies().is_empty());
    }

    #[test]
    fn concurrent_resolution_shares_one_assembly() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let context = AssemblyLoadContext::new(move |identity: &AssemblyIdentity, _: AssemblyFlags| {
            counter.fetch_add(1, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(50));
            ModuleFile::from_mem(MetadataBuilder::new(&identity.name).build())
        });

        let start = Barrier::new(4);
        let loaded = thread::scope(|scope| {
            let handles = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        start.wait();
                        context.resolve(&identity("Shared"), AssemblyFlags::empty())
                    })
                })
                .collect::<Vec<_>>();
            handles
                .into_iter()
                .map(|handle| handle.join().unwrap().unwrap())
                .collect::<Vec<_>>()
        });

        assert!(loaded.iter().all(|assembly| Arc::ptr_eq(assembly, &loaded[0])));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(context.assemblies().len(), 1);
        assert!(context.inner.loading.is_empty());
        assert!(context.inner.owners.is_empty());
    }

    #[test]
    fn crossed_resolution_between_threads_is_a_cycle() {
        let slot: Arc<OnceLock<AssemblyLoadContext>> = Arc::new(OnceLock::new());
        let both_started = Arc::new(Barrier::new(2));
        let calls = Arc::new(AtomicUsize::new(0));

        let inner = Arc::clone(&slot);
        let context = AssemblyLoadContext::new(move |identity: &AssemblyIdentity, flags: AssemblyFlags| {
            let Some(context) = inner.get() else {
                return no_resolver(identity, flags);
            };
            // Both threads own their first slot before asking for the other one
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                both_started.wait();
            }
            let next = if identity.name == "Left" { "Right" } else { "Left" };
            context.resolve(&AssemblyIdentity::new(next, identity.version), flags)?;
            ModuleFile::from_mem(MetadataBuilder::new(&identity.name).build())
        });
        assert!(slot.set(context.clone()).is_ok());

        let results = thread::scope(|scope| {
            let left = scope.spawn(|| context.resolve(&identity("Left"), AssemblyFlags::empty()));
            let right = scope.spawn(|| context.resolve(&identity("Right"), AssemblyFlags::empty()));
            [left.join().unwrap(), right.join().unwrap()]
        });

        for result in results {
            match result {
                Err(Error::ReferenceCycle(chain)) => {
                    assert!(chain.contains("Left"));
                    assert!(chain.contains("Right"));
                }
                other => panic!("unexpected {other:?}"),
            }
        }
        assert!(context.assemblies().is_empty());
        assert!(context.inner.waiting.is_empty());
        assert!(context.inner.loading.is_empty());
    }

    #[test]
    fn core_library_is_tracked() {
        let context = AssemblyLoadContext::default();
        assert!(context.core_library().is_none());

        context.load_mem(MetadataBuilder::new("App").build()).unwrap();
        let core = context
            .load_mem(MetadataBuilder::new("System.Private.CoreLib").build())
            .unwrap();
        assert!(Arc::ptr_eq(&context.core_library().unwrap(), &core));
    }
}
