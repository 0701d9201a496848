//! Per-entity lock registry.
//!
//! Every workflow transition is a read-modify-write against the backing
//! store; the guard evaluation and the status mutation must happen under
//! one lock so two concurrent transitions on the same id cannot both
//! succeed from the same source state.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of per-entity mutexes keyed by entity id
#[derive(Default)]
pub struct EntityLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl EntityLocks {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquire the lock for the given entity id, creating it on first use.
    ///
    /// The guard must be held across the full load-guard-mutate-save
    /// sequence for that entity.
    pub async fn acquire(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(key.to_string())
            .or_default()
            .clone();
        lock.lock_owned().await
    }
}
