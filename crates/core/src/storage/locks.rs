//! Per-collection lock registry.
//!
//! Each collection name maps to exactly one [`CollectionLock`] for the life of
//! the registry. Lookup-or-insert happens as a single step under the registry
//! guard, so concurrent first-time callers for the same name always receive
//! the same instance.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Lock guarding one collection directory.
///
/// Writers and deleters take it exclusively. Readers only take it (shared)
/// when the store runs with locked reads.
pub type CollectionLock = RwLock<()>;

/// Registry of collection locks, owned by one store.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: Mutex<HashMap<String, Arc<CollectionLock>>>,
    /// Number of lock instances ever allocated.
    created: AtomicUsize,
}

impl LockRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for `collection`, registering a new one if none exists.
    ///
    /// The registry guard is released before returning; callers lock the
    /// returned handle for their own critical section.
    pub fn acquire(&self, collection: &str) -> Arc<CollectionLock> {
        let mut locks = self.locks.lock();
        if let Some(lock) = locks.get(collection) {
            return Arc::clone(lock);
        }
        let lock = Arc::new(CollectionLock::new(()));
        locks.insert(collection.to_string(), Arc::clone(&lock));
        self.created.fetch_add(1, Ordering::Relaxed);
        tracing::trace!("registered lock for collection '{}'", collection);
        lock
    }

    /// Number of collections with a registered lock.
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    /// Returns `true` if no collection lock has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total lock instances allocated since construction.
    pub fn created_count(&self) -> usize {
        self.created.load(Ordering::Relaxed)
    }
}
