//! Per-owner import locks.
//!
//! Imports for one owner run one at a time; imports for different owners
//! run concurrently.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Registry of one async mutex per owner.
#[derive(Debug, Default)]
pub struct ImportLocks {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl ImportLocks {
    /// Create a new lock registry.
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Create a new lock registry wrapped in Arc for sharing.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Wait for exclusive access to an owner's library.
    ///
    /// The returned guard releases the lock when dropped.
    pub async fn acquire(&self, owner_id: &str) -> OwnedMutexGuard<()> {
        // Clone the Arc out so the map shard is not held across the await
        let lock = self
            .locks
            .entry(owner_id.to_string())
            .or_default()
            .clone();

        let guard = lock.lock_owned().await;
        tracing::debug!(owner = %owner_id, "import lock acquired");
        guard
    }

    /// Drop locks nobody is holding or waiting on.
    pub fn prune(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        before - self.locks.len()
    }

    /// Number of owners with a registered lock.
    pub fn owner_count(&self) -> usize {
        self.locks.len()
    }
}
