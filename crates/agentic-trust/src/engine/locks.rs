//! Keyed mutual exclusion with deadline-bounded waits.
//!
//! A [`LockTable`] holds the set of currently locked keys. Acquiring a key
//! waits on a condvar until the key is free or the caller's deadline
//! passes; the returned guard frees the key on drop.

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Condvar, Mutex, MutexGuard};
use std::time::Duration;

use crate::deadline::Deadline;
use crate::error::{Result, TrustError};

pub struct LockTable<K> {
    held: Mutex<HashSet<K>>,
    released: Condvar,
    poll: Duration,
}

impl<K: Eq + Hash + Ord + Clone> LockTable<K> {
    /// `poll` bounds how long a waiter sleeps before re-checking a
    /// cancellation flag.
    pub fn new(poll: Duration) -> Self {
        Self {
            held: Mutex::new(HashSet::new()),
            released: Condvar::new(),
            poll: poll.max(Duration::from_millis(1)),
        }
    }

    fn held(&self) -> Result<MutexGuard<'_, HashSet<K>>> {
        self.held
            .lock()
            .map_err(|_| TrustError::Storage("lock table poisoned".into()))
    }

    /// Lock one key.
    pub fn acquire(&self, key: &K, deadline: &Deadline) -> Result<KeyGuard<'_, K>> {
        self.acquire_many(std::slice::from_ref(key), deadline)
    }

    /// Lock several keys at once. Keys are taken all-or-nothing so two
    /// callers locking overlapping sets cannot deadlock.
    pub fn acquire_many(&self, keys: &[K], deadline: &Deadline) -> Result<KeyGuard<'_, K>> {
        let mut keys: Vec<K> = keys.to_vec();
        keys.sort();
        keys.dedup();

        let mut held = self.held()?;
        loop {
            deadline.check("lock acquisition")?;
            if keys.iter().all(|k| !held.contains(k)) {
                held.extend(keys.iter().cloned());
                return Ok(KeyGuard { table: self, keys });
            }

            let wait = match deadline.remaining() {
                Some(left) if left.is_zero() => continue,
                Some(left) => left.min(self.poll),
                None => self.poll,
            };
            let (guard, _) = self
                .released
                .wait_timeout(held, wait)
                .map_err(|_| TrustError::Storage("lock table poisoned".into()))?;
            held = guard;
        }
    }

    /// `true` if `key` is currently locked.
    pub fn is_locked(&self, key: &K) -> bool {
        self.held().map(|h| h.contains(key)).unwrap_or(false)
    }
}

/// Frees its keys on drop.
pub struct KeyGuard<'a, K: Eq + Hash> {
    table: &'a LockTable<K>,
    keys: Vec<K>,
}

impl<K: Eq + Hash> Drop for KeyGuard<'_, K> {
    fn drop(&mut self) {
        // A poisoned table can only come from a panic while the set was
        // being edited; the keys are released either way.
        let mut held = match self.table.held.lock() {
            Ok(h) => h,
            Err(poisoned) => poisoned.into_inner(),
        };
        for k in &self.keys {
            held.remove(k);
        }
        drop(held);
        self.table.released.notify_all();
    }
}
