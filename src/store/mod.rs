//! Capacity-bounded concurrent key/value store.
//!
//! The store is the single owner of every entry: a map of key to
//! `(value, deadline)` behind one reader-writer lock, with no eviction
//! opinion of its own. When it is full it says so via
//! [`CacheFull`](crate::error::CacheFull) and lets the policy layer decide
//! what to remove.
//!
//! ## Key Components
//! - [`Store`]: `RwLock<FxHashMap<K, Entry<V>>>` plus atomic counters.
//!
//! ## Core Operations
//! - `set`: insert or update; fails with `CacheFull` only for new keys at
//!   capacity.
//! - `get`: fresh hit, `KeyNotFound`, or `Expired` with the stale value
//!   surfaced. Expired entries are reported, never removed here.
//! - `evict`: remove explicit keys, return the new size.
//! - `trim`: remove entries whose deadline passed strictly before `now`.
//!
//! ## Thread Safety
//! - Readers (`get`, `len`, `metrics`) take the read lock; `hits`/`misses`
//!   are relaxed atomics so the hot path never takes the write lock.
//! - Writers (`set`, `evict`, `trim`) take the write lock; `evicts` and
//!   `expired` are charged only there.

use std::hash::Hash;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::error::{CacheFull, GetError};
use crate::expiry::Expiry;
use crate::metrics::{CacheCounters, MetricsSnapshot};
use crate::traits::Cache;

#[derive(Debug)]
struct Entry<V> {
    value: Arc<V>,
    expires: Expiry,
}

/// Unpoliced map of key to `(value, deadline)` with a size cap.
///
/// Capacity `0` means unbounded. Stale entries stay resident until `trim`,
/// `evict`, or a policy eviction removes them.
#[derive(Debug)]
pub struct Store<K, V> {
    map: RwLock<FxHashMap<K, Entry<V>>>,
    capacity: usize,
    counters: CacheCounters,
}

impl<K, V> Store<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates a store holding at most `capacity` entries; `0` is unbounded.
    pub fn new(capacity: usize) -> Self {
        Self {
            map: RwLock::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
            capacity,
            counters: CacheCounters::default(),
        }
    }
}

impl<K, V> Cache<K, V> for Store<K, V>
where
    K: Clone + Eq + Hash + Send + Sync,
    V: Send + Sync,
{
    fn get(&self, key: &K) -> Result<(Arc<V>, Expiry), GetError<V>> {
        let map = self.map.read();
        let Some(entry) = map.get(key) else {
            self.counters.inc_miss();
            return Err(GetError::KeyNotFound);
        };
        if entry.expires.is_fresh_at(SystemTime::now()) {
            self.counters.inc_hit();
            Ok((entry.value.clone(), entry.expires))
        } else {
            self.counters.inc_miss();
            Err(GetError::Expired {
                value: entry.value.clone(),
                expires: entry.expires,
            })
        }
    }

    fn set(&self, key: K, value: Arc<V>, expires: Expiry) -> Result<(), CacheFull> {
        let mut map = self.map.write();
        if self.capacity > 0 && map.len() >= self.capacity && !map.contains_key(&key) {
            return Err(CacheFull);
        }
        map.insert(key, Entry { value, expires });
        Ok(())
    }

    fn evict(&self, keys: &[K]) -> usize {
        let mut map = self.map.write();
        let mut removed = 0u64;
        for key in keys {
            if map.remove(key).is_some() {
                removed += 1;
            }
        }
        if removed > 0 {
            self.counters.add_evicts(removed);
        }
        map.len()
    }

    fn trim(&self, now: SystemTime) -> Vec<K> {
        let mut map = self.map.write();
        let stale: Vec<K> = map
            .iter()
            .filter(|(_, entry)| entry.expires.expired_before(now))
            .map(|(key, _)| key.clone())
            .collect();
        for key in &stale {
            map.remove(key);
        }
        if !stale.is_empty() {
            self.counters.add_expired(stale.len() as u64);
        }
        stale
    }

    fn len(&self) -> usize {
        self.map.read().len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn metrics(&self) -> MetricsSnapshot {
        let items = self.map.read().len();
        self.counters.snapshot(items)
    }
}
