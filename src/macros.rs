#![allow(unused_macros)]

//! Lock helpers.
//!
//! A poisoned lock means another thread panicked while holding it. These macros turn that into
//! [`crate::Error::LockError`] and propagate it with `?`, so they may only be used inside
//! functions returning [`crate::Result`].

/// Acquire a `Mutex`, propagating poisoning as [`crate::Error::LockError`].
macro_rules! lock {
    ($lock:expr) => {
        $lock.lock().map_err(|_| crate::Error::LockError)?
    };
}

/// Acquire the read side of an `RwLock`, propagating poisoning as [`crate::Error::LockError`].
macro_rules! read_lock {
    ($rwlock:expr) => {
        $rwlock.read().map_err(|_| crate::Error::LockError)?
    };
}

/// Acquire the write side of an `RwLock`, propagating poisoning as [`crate::Error::LockError`].
macro_rules! write_lock {
    ($rwlock:expr) => {
        $rwlock.write().map_err(|_| crate::Error::LockError)?
    };
}
