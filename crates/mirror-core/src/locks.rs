//! Per-repository operation locks

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use mirror_fs::NormalizedPath;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockKey = (NormalizedPath, String);

/// Serializes engine operations per local path and branch.
///
/// Cloning shares the lock table, so a scheduler task and an interactive
/// command can hold clones of the same `OperationLocks`.
#[derive(Debug, Clone, Default)]
pub struct OperationLocks {
    table: Arc<Mutex<HashMap<LockKey, Arc<AsyncMutex<()>>>>>,
}

impl OperationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other operation holds `path` and `branch`.
    ///
    /// The lock is held until the returned guard is dropped.
    pub async fn acquire(&self, path: &NormalizedPath, branch: &str) -> OwnedMutexGuard<()> {
        self.entry(path, branch).lock_owned().await
    }

    /// Take the lock only if it is free right now.
    pub fn try_acquire(&self, path: &NormalizedPath, branch: &str) -> Option<OwnedMutexGuard<()>> {
        self.entry(path, branch).try_lock_owned().ok()
    }

    fn entry(&self, path: &NormalizedPath, branch: &str) -> Arc<AsyncMutex<()>> {
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        table
            .entry((path.clone(), branch.to_string()))
            .or_default()
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn same_key_is_exclusive() {
        let locks = OperationLocks::new();
        let path = NormalizedPath::new("/m/notes");

        let guard = locks.acquire(&path, "main").await;
        assert!(locks.try_acquire(&path, "main").is_none());
        assert!(locks.try_acquire(&path, "dev").is_some());
        assert!(locks.clone().try_acquire(&path, "main").is_none());

        drop(guard);
        assert!(locks.try_acquire(&path, "main").is_some());
    }
}
