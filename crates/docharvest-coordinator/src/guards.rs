//! One scan at a time per source

use docharvest_domain::SourceId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

/// Registry of per-source scan locks
///
/// A second scan of the same source waits for the first to finish. Scans of
/// different sources never contend.
#[derive(Debug, Default)]
pub struct ScanGuards {
    locks: Mutex<HashMap<SourceId, Arc<AsyncMutex<()>>>>,
}

impl ScanGuards {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, id: &SourceId) -> Arc<AsyncMutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        Arc::clone(locks.entry(id.clone()).or_default())
    }

    /// Wait until no other scan of `id` is in flight
    pub async fn acquire(&self, id: &SourceId) -> OwnedMutexGuard<()> {
        self.lock_for(id).lock_owned().await
    }

    /// Whether a scan of `id` is currently in flight
    pub fn is_busy(&self, id: &SourceId) -> bool {
        let locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        locks.get(id).is_some_and(|lock| lock.try_lock().is_err())
    }

    /// Drop the lock of a source that is no longer tracked
    ///
    /// Kept while a scan still holds or waits for it.
    pub fn forget(&self, id: &SourceId) -> bool {
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        match locks.get(id) {
            Some(lock) if Arc::strong_count(lock) == 1 => {
                locks.remove(id);
                true
            }
            _ => false,
        }
    }

    /// Number of sources with a lock entry
    pub fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    /// Whether no source has a lock entry
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
