//! Per-identity concurrency control.
//!
//! Serializes `activate`/`validate`/`deactivate` for one user id while
//! leaving other identities untouched.  The map mutex is only held long
//! enough to clone a semaphore handle, never across store I/O.  Entries
//! live only while someone holds or awaits them, so lookups for arbitrary
//! user ids do not grow the map.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

use ssa_domain::error::{Error, Result};

/// Manages per-identity locks.
///
/// Each user id maps to a `Semaphore(1)`.  Holding a [`UserLock`] gives
/// exclusive access to that identity's session slot.
#[derive(Debug)]
pub struct UserLockMap {
    locks: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl Default for UserLockMap {
    fn default() -> Self {
        Self::new()
    }
}

impl UserLockMap {
    pub fn new() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Acquire the lock for `user_id`, waiting behind any in-flight call
    /// for the same identity.
    pub async fn acquire(&self, user_id: &str) -> Result<UserLock<'_>> {
        let sem = {
            let mut locks = self.locks.lock();
            locks
                .entry(user_id.to_owned())
                .or_insert_with(|| Arc::new(Semaphore::new(1)))
                .clone()
        };

        // Semaphores in the map are never closed.
        let acquired = sem.acquire_owned().await;
        let lock = UserLock {
            permit: acquired.ok(),
            map: self,
            user_id: user_id.to_owned(),
        };
        if lock.permit.is_none() {
            return Err(Error::Other(format!("session lock for {user_id} closed")));
        }
        Ok(lock)
    }

    /// Drop the entry for `user_id` if nobody holds or awaits it.
    ///
    /// Handles are only cloned under the map mutex, so a strong count of 1
    /// means the map owns the only reference.
    pub fn release(&self, user_id: &str) {
        let mut locks = self.locks.lock();
        if locks
            .get(user_id)
            .is_some_and(|sem| Arc::strong_count(sem) == 1)
        {
            locks.remove(user_id);
        }
    }

    /// Number of tracked identities (for monitoring).
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }

    /// Remove every entry that is not currently held or awaited.
    pub fn prune_idle(&self) {
        let mut locks = self.locks.lock();
        locks.retain(|_, sem| Arc::strong_count(sem) > 1);
    }
}

/// Exclusive hold on one identity.  Dropping it releases the permit and
/// forgets the map entry when no other caller is waiting.
#[derive(Debug)]
pub struct UserLock<'a> {
    permit: Option<OwnedSemaphorePermit>,
    map: &'a UserLockMap,
    user_id: String,
}

impl Drop for UserLock<'_> {
    fn drop(&mut self) {
        drop(self.permit.take());
        self.map.release(&self.user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sequential_access() {
        let map = UserLockMap::new();

        let permit1 = map.acquire("alice").await.unwrap();
        drop(permit1);

        let permit2 = map.acquire("alice").await.unwrap();
        drop(permit2);
    }

    #[tokio::test]
    async fn different_users_concurrent() {
        let map = UserLockMap::new();

        let p1 = map.acquire("alice").await.unwrap();
        let p2 = map.acquire("bob").await.unwrap();

        // Both acquired simultaneously.
        assert_eq!(map.len(), 2);

        drop(p1);
        drop(p2);
    }

    #[tokio::test]
    async fn same_user_waits() {
        let map = Arc::new(UserLockMap::new());
        let map2 = map.clone();

        let p1 = map.acquire("alice").await.unwrap();

        let handle = tokio::spawn(async move {
            let _p2 = map2.acquire("alice").await.unwrap();
            42
        });

        // Give the waiter a moment to queue.
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        assert!(!handle.is_finished());

        drop(p1);

        assert_eq!(handle.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn release_keeps_held_entries() {
        let map = UserLockMap::new();

        let lock = map.acquire("alice").await.unwrap();
        map.release("alice");
        assert_eq!(map.len(), 1);

        drop(lock);
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn dropping_lock_forgets_entry() {
        let map = UserLockMap::new();
        for i in 0..100 {
            drop(map.acquire(&format!("ghost-{i}")).await.unwrap());
        }
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn waiter_keeps_entry_alive() {
        let map = Arc::new(UserLockMap::new());
        let map2 = map.clone();

        let first = map.acquire("alice").await.unwrap();
        let waiter = tokio::spawn(async move {
            let _second = map2.acquire("alice").await.unwrap();
            map2.len()
        });
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        // The queued waiter still references the semaphore.
        drop(first);
        assert_eq!(waiter.await.unwrap(), 1);
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn closed_lock_is_an_internal_error() {
        let map = UserLockMap::new();
        let sem = Arc::new(Semaphore::new(1));
        sem.close();
        map.locks.lock().insert("alice".into(), sem);

        let err = map.acquire("alice").await.unwrap_err();
        assert!(matches!(err, Error::Other(_)));
        assert!(!err.is_store_unavailable());
        assert!(map.is_empty());
    }

    #[tokio::test]
    async fn prune_idle_keeps_held() {
        let map = UserLockMap::new();

        let held = map.acquire("alice").await.unwrap();
        map.prune_idle();
        assert_eq!(map.len(), 1);

        drop(held);
        map.prune_idle();
        assert!(map.is_empty());
    }
}
