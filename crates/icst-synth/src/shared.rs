//! Process-wide lookup tables shared between instances.
//!
//! A table is built by the first instance that needs it and freed when the
//! last one is dropped. The lock is only taken while constructing an
//! instance; rendering reads through the instance's own [`Arc`].

use std::sync::{Arc, Mutex, PoisonError, Weak};

/// Lazily built, reference counted read-only table.
///
/// # Example
///
/// ```rust
/// use icst_synth::SharedTable;
/// use std::sync::Arc;
///
/// static SQUARES: SharedTable<Vec<u32>> = SharedTable::new();
///
/// let a = SQUARES.acquire(|| (0..16).map(|i| i * i).collect());
/// let b = SQUARES.acquire(|| unreachable!());
/// assert!(Arc::ptr_eq(&a, &b));
/// assert_eq!(a[3], 9);
/// ```
#[derive(Debug)]
pub struct SharedTable<T> {
    slot: Mutex<Weak<T>>,
}

impl<T> SharedTable<T> {
    /// Empty slot, usable in a `static`.
    pub const fn new() -> Self {
        Self {
            slot: Mutex::new(Weak::new()),
        }
    }

    /// The live table, or a fresh one from `build` if none is alive.
    pub fn acquire(&self, build: impl FnOnce() -> T) -> Arc<T> {
        // a panic while building leaves the slot empty, so the guard is still usable
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(table) = slot.upgrade() {
            return table;
        }
        let table = Arc::new(build());
        *slot = Arc::downgrade(&table);
        table
    }

    /// Whether some instance currently holds the table.
    pub fn is_alive(&self) -> bool {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .strong_count()
            > 0
    }
}

impl<T> Default for SharedTable<T> {
    fn default() -> Self {
        Self::new()
    }
}
