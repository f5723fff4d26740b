use std::{
    fmt,
    hash::{Hash, Hasher},
    sync::{Arc, Weak},
};

use crate::{Error, Result};

/// A non-owning reference to an entity of the metadata graph.
///
/// Entities own their children (a type owns its members) and refer to everything else through
/// an `EntityRef`, so the graph has no ownership cycles: a self-referential type or two
/// assemblies referencing each other are freed with their load context. Upgrading after the
/// owner is gone yields [`Error::EntityDropped`].
///
/// Equality and hashing are by identity of the referenced allocation.
pub struct EntityRef<T> {
    weak_ref: Weak<T>,
}

impl<T> EntityRef<T> {
    /// Create a reference to `strong_ref` without keeping it alive.
    #[must_use]
    pub fn new(strong_ref: &Arc<T>) -> Self {
        EntityRef {
            weak_ref: Arc::downgrade(strong_ref),
        }
    }

    pub(crate) fn from_weak(weak_ref: Weak<T>) -> Self {
        EntityRef { weak_ref }
    }

    /// A strong reference to the entity.
    ///
    /// # Errors
    /// Returns [`Error::EntityDropped`] if the entity no longer exists.
    pub fn get(&self) -> Result<Arc<T>> {
        self.weak_ref.upgrade().ok_or(Error::EntityDropped)
    }

    /// Whether the entity still exists.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.weak_ref.strong_count() > 0
    }

    /// Whether this references the allocation behind `other`.
    #[must_use]
    pub fn points_to(&self, other: &Arc<T>) -> bool {
        std::ptr::eq(self.weak_ref.as_ptr(), Arc::as_ptr(other))
    }
}

impl<T> Clone for EntityRef<T> {
    fn clone(&self) -> Self {
        EntityRef {
            weak_ref: self.weak_ref.clone(),
        }
    }
}

impl<T> PartialEq for EntityRef<T> {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.weak_ref, &other.weak_ref)
    }
}

impl<T> Eq for EntityRef<T> {}

impl<T> Hash for EntityRef<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.weak_ref.as_ptr(), state);
    }
}

impl<T> fmt::Debug for EntityRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityRef({:p}, valid: {})", self.weak_ref.as_ptr(), self.is_valid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_and_lifetime() {
        let first = Arc::new(5u32);
        let second = Arc::new(5u32);

        let reference = EntityRef::new(&first);
        assert_eq!(*reference.get().unwrap(), 5);
        assert!(reference.points_to(&first));
        assert!(!reference.points_to(&second));
        assert_eq!(reference, EntityRef::new(&first));
        assert_ne!(reference, EntityRef::new(&second));

        drop(first);
        assert!(!reference.is_valid());
        assert!(matches!(reference.get(), Err(Error::EntityDropped)));
    }
}
