//! Keyed in-process locks
//!
//! Serializes read-modify-write sequences on the same key inside one
//! process. Other processes sharing the access group are not covered.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::Mutex;

/// Lock table keyed by `K`; slots are dropped once nobody holds them
#[derive(Debug)]
pub(crate) struct KeyedLocks<K> {
    table: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K: Hash + Eq + Clone> KeyedLocks<K> {
    pub(crate) fn new() -> Self {
        Self {
            table: Mutex::new(HashMap::new()),
        }
    }

    /// Run `f` while holding the lock for `key`
    pub(crate) fn with_lock<R>(&self, key: &K, f: impl FnOnce() -> R) -> R {
        let slot = self.table.lock().entry(key.clone()).or_default().clone();

        let result = {
            let _guard = slot.lock();
            f()
        };

        let mut table = self.table.lock();
        // One reference in the table, one here: no one else is waiting
        if Arc::strong_count(&slot) == 2 {
            table.remove(key);
        }
        result
    }

    /// Number of keys currently locked or awaited
    pub(crate) fn active(&self) -> usize {
        self.table.lock().len()
    }
}
