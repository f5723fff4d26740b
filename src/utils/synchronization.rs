//! Compute-once cells for lazily materialized entity properties.
//!
//! Every derived property of a logical entity (base type, member lists, signatures, attributes)
//! is decoded on first access and cached for the lifetime of the entity. [`Memo`] provides that
//! with three guarantees:
//!
//! - the initializer runs at most once per cell, even when several threads race for it
//! - a failed initialization caches nothing, so the error is reported again on the next access
//! - a thread that re-enters a cell it is currently initializing gets a format error instead of
//!   a deadlock, which is how cyclic metadata (a type that is its own base) surfaces

use std::{
    cell::RefCell,
    fmt,
    sync::{Mutex, OnceLock},
};

use crate::Result;

thread_local! {
    /// Addresses of the cells the current thread is initializing
    static INITIALIZING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Removes a cell from [`INITIALIZING`] when initialization ends, including by panic.
struct InitGuard(usize);

impl InitGuard {
    fn enter(key: usize) -> Option<Self> {
        INITIALIZING.with(|active| {
            let mut active = active.borrow_mut();
            if active.contains(&key) {
                None
            } else {
                active.push(key);
                Some(InitGuard(key))
            }
        })
    }
}

impl Drop for InitGuard {
    fn drop(&mut self) {
        INITIALIZING.with(|active| {
            let mut active = active.borrow_mut();
            if let Some(position) = active.iter().rposition(|key| *key == self.0) {
                active.remove(position);
            }
        });
    }
}

/// A lazily initialized, thread-safe value computed by a fallible initializer.
pub struct Memo<T> {
    value: OnceLock<T>,
    init_lock: Mutex<()>,
}

impl<T> Memo<T> {
    /// An empty cell.
    #[must_use]
    pub const fn new() -> Self {
        Memo {
            value: OnceLock::new(),
            init_lock: Mutex::new(()),
        }
    }

    /// The value, if it has been computed.
    pub fn get(&self) -> Option<&T> {
        self.value.get()
    }

    /// Whether the value has been computed.
    pub fn is_initialized(&self) -> bool {
        self.value.get().is_some()
    }

    /// The cached value, computing it with `init` on first access.
    ///
    /// # Errors
    /// Returns the error of `init`, [`crate::Error::Malformed`] if the current thread is already
    /// initializing this cell, or [`crate::Error::LockError`] if a previous initializer panicked.
    pub fn get_or_try_init<F>(&self, init: F) -> Result<&T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let key = std::ptr::from_ref(self) as usize;
        let Some(_reentry) = InitGuard::enter(key) else {
            return Err(malformed_error!(
                "Cyclic metadata - a lazily computed value depends on itself"
            ));
        };

        let _lock = lock!(self.init_lock);
        if let Some(value) = self.value.get() {
            return Ok(value);
        }

        let value = init()?;
        Ok(self.value.get_or_init(|| value))
    }
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value.get() {
            Some(value) => f.debug_tuple("Memo").field(value).finish(),
            None => f.write_str("Memo(<uninit>)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    };
    use std::thread;

    use super::*;

    #[test]
    fn computes_once() {
        let memo = Memo::new();
        let calls = AtomicUsize::new(0);

        for _ in 0..3 {
            let value = memo
                .get_or_try_init(|| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(42)
                })
                .unwrap();
            assert_eq!(*value, 42);
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(memo.is_initialized());
    }

    #[test]
    fn error_is_not_cached() {
        let memo: Memo<u32> = Memo::new();
        assert!(memo
            .get_or_try_init(|| Err(malformed_error!("first attempt")))
            .is_err());
        assert!(!memo.is_initialized());
        assert_eq!(*memo.get_or_try_init(|| Ok(7)).unwrap(), 7);
    }

    #[test]
    fn reentry_is_rejected() {
        let memo: Memo<u32> = Memo::new();
        let result = memo.get_or_try_init(|| {
            let inner = memo.get_or_try_init(|| Ok(1));
            assert!(inner.is_err());
            inner.map(|value| *value)
        });

        assert!(result.is_err());
        // the guard was released, a later non-cyclic init succeeds
        assert_eq!(*memo.get_or_try_init(|| Ok(2)).unwrap(), 2);
    }

    #[test]
    fn concurrent_first_access() {
        let memo = Arc::new(Memo::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let memo = Arc::clone(&memo);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    let value = memo
                        .get_or_try_init(|| {
                            calls.fetch_add(1, Ordering::SeqCst);
                            Ok(vec![1, 2, 3])
                        })
                        .unwrap();
                    value.as_ptr() as usize
                })
            })
            .collect();

        let addresses: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert!(addresses.windows(2).all(|pair| pair[0] == pair[1]));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
