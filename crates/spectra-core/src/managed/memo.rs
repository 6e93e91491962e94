//! Once-computed, resettable cell

use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// A value computed on first read and kept until invalidated
///
/// Concurrent readers block on the first caller's computation and then
/// share its result. No lock of the cell is held while the initializer
/// runs, so it may inspect the cell ([`Memo::get`], [`Memo::is_memoized`],
/// `Debug`); it must not initialize the same cell again. Invalidation
/// swaps in a fresh slot and leaves a running computation to finish on the
/// old one.
pub struct Memo<T> {
    slot: RwLock<Arc<OnceCell<T>>>,
}

impl<T: Clone> Memo<T> {
    /// An empty cell
    pub fn new() -> Self {
        Self {
            slot: RwLock::new(Arc::new(OnceCell::new())),
        }
    }

    /// A cell holding `value`
    pub fn with_value(value: T) -> Self {
        Self {
            slot: RwLock::new(Arc::new(OnceCell::with_value(value))),
        }
    }

    fn current(&self) -> Arc<OnceCell<T>> {
        self.slot.read().clone()
    }

    /// The memoized value, if any
    pub fn get(&self) -> Option<T> {
        self.current().get().cloned()
    }

    /// The memoized value, computing it first if needed
    pub fn get_or_init(&self, init: impl FnOnce() -> T) -> T {
        self.current().get_or_init(init).clone()
    }

    /// Like [`Memo::get_or_init`]; a failed computation memoizes nothing
    pub fn get_or_try_init<E>(&self, init: impl FnOnce() -> Result<T, E>) -> Result<T, E> {
        self.current().get_or_try_init(init).cloned()
    }

    /// Replace the memoized value
    pub fn set(&self, new_value: T) {
        *self.slot.write() = Arc::new(OnceCell::with_value(new_value));
    }

    /// Drop the memoized value; the next read recomputes
    pub fn invalidate(&self) -> Option<T> {
        let old = std::mem::replace(&mut *self.slot.write(), Arc::new(OnceCell::new()));
        old.get().cloned()
    }

    /// Whether a value is currently memoized
    pub fn is_memoized(&self) -> bool {
        self.current().get().is_some()
    }
}

impl<T: Clone> Default for Memo<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let current = self.slot.read().clone();
        f.debug_tuple("Memo").field(&current.get()).finish()
    }
}
