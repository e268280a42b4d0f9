//! Per-package serialization of manifest updates.
//!
//! Publishing reads the stored manifest, merges the incoming versions into it
//! and writes it back. Two publishes of the same package must not interleave
//! those steps, or the later write drops a version recorded by the earlier
//! one. [`PackageLocks`] hands out one async mutex per package name; callers
//! hold the returned guard for the whole read-merge-write. Different names
//! never contend.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::trace;

type LockTable = HashMap<String, Arc<AsyncMutex<()>>>;

/// Table of per-package async locks.
///
/// Entries are created on first use and removed again once no task holds or
/// waits for them, so the table only grows with the number of packages being
/// published at the same moment.
#[derive(Debug, Default)]
pub struct PackageLocks {
    table: Mutex<LockTable>,
}

/// Exclusive access to one package name. Released on drop.
#[derive(Debug)]
pub struct PackageGuard<'a> {
    locks: &'a PackageLocks,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl PackageLocks {
    pub fn new() -> Self {
        Self::default()
    }

    // The table holds no invariant a panicking holder could break.
    fn lock_table(&self) -> MutexGuard<'_, LockTable> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Waits until no other task holds the lock for `key`, then takes it.
    pub async fn acquire(&self, key: &str) -> PackageGuard<'_> {
        let lock = {
            let mut table = self.lock_table();
            Arc::clone(table.entry(key.to_string()).or_default())
        };

        let guard = lock.lock_owned().await;
        trace!(package = %key, "Acquired package lock");

        PackageGuard {
            locks: self,
            key: key.to_string(),
            guard: Some(guard),
        }
    }

    /// Number of package names with a live lock entry.
    pub fn len(&self) -> usize {
        self.lock_table().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl PackageGuard<'_> {
    pub fn package(&self) -> &str {
        &self.key
    }
}

impl Drop for PackageGuard<'_> {
    fn drop(&mut self) {
        drop(self.guard.take());

        let mut table = self.locks.lock_table();
        // Only the table's own reference left: nobody holds or waits on it.
        if table
            .get(&self.key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            table.remove(&self.key);
        }
        trace!(package = %self.key, "Released package lock");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_entries_removed_after_release() {
        let locks = PackageLocks::new();
        {
            let guard = locks.acquire("pkg-a").await;
            assert_eq!(guard.package(), "pkg-a");
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }

    #[tokio::test]
    async fn test_distinct_names_do_not_block() {
        let locks = PackageLocks::new();
        let _a = locks.acquire("pkg-a").await;
        let b = tokio::time::timeout(Duration::from_secs(1), locks.acquire("pkg-b")).await;
        assert!(b.is_ok());
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_same_name_is_exclusive() {
        let locks = Arc::new(PackageLocks::new());
        let inside = Arc::new(AtomicUsize::new(0));
        let max_inside = Arc::new(AtomicUsize::new(0));

        let tasks: Vec<_> = (0..16)
            .map(|_| {
                let locks = Arc::clone(&locks);
                let inside = Arc::clone(&inside);
                let max_inside = Arc::clone(&max_inside);
                tokio::spawn(async move {
                    let _guard = locks.acquire("shared").await;
                    let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                    max_inside.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(2)).await;
                    inside.fetch_sub(1, Ordering::SeqCst);
                })
            })
            .collect();

        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
        assert!(locks.is_empty());
    }
}
