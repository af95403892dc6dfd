//! Least-frequently-used eviction.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────────┐
//!   │                        LfuCache<K, V>                          │
//!   │                                                                │
//!   │   get hit ──► TouchQueue<K> ──► drain: counter[k] += 1         │
//!   │                                                                │
//!   │   Mutex<FxHashMap<K, u64>>  (access counters)                  │
//!   │   ┌──────────┬───────┐                                         │
//!   │   │  page_1  │  15   │  ← hot, evicted last                    │
//!   │   │  page_2  │   3   │                                         │
//!   │   │  page_3  │   0   │  ← cold, next victim                    │
//!   │   └──────────┴───────┘                                         │
//!   │                                                                │
//!   │   Store<K, V>  (entries live here)                             │
//!   └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Ordering is computed on demand: only a `set` that hits capacity sorts
//! the counters (ascending) and evicts from the cold end until the insert
//! fits. Counter ties resolve in map iteration order, which is stable for
//! a given set of residents within a run.
//!
//! A fresh key starts at zero. Updating a resident key refreshes value and
//! deadline but deliberately keeps the accumulated counter — frequency
//! describes the key, not the current value.

use std::hash::Hash;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::TouchQueue;
use crate::error::{CacheFull, GetError};
use crate::expiry::Expiry;
use crate::metrics::MetricsSnapshot;
use crate::store::Store;
use crate::traits::Cache;

/// Cache that evicts the least-frequently-accessed entry when full.
#[derive(Debug)]
pub struct LfuCache<K, V> {
    store: Store<K, V>,
    counters: Mutex<FxHashMap<K, u64>>,
    touches: TouchQueue<K>,
}

impl<K, V> LfuCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an LFU cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            store: Store::new(capacity),
            counters: Mutex::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
            touches: TouchQueue::with_capacity(capacity),
        }
    }

    /// Applies all pending touches to the counters now.
    pub fn flush(&self) {
        Self::apply_touches(&mut self.counters.lock(), &self.touches);
    }

    /// Returns the access counter for a resident key.
    ///
    /// Pending touches are applied first, so the answer reflects every hit
    /// that completed before the call.
    pub fn frequency(&self, key: &K) -> Option<u64> {
        let mut counters = self.counters.lock();
        Self::apply_touches(&mut counters, &self.touches);
        counters.get(key).copied()
    }

    /// Drains the queue, counting touches for still-resident keys only.
    /// A touch for a key evicted in the meantime must not resurrect it.
    fn apply_touches(counters: &mut FxHashMap<K, u64>, touches: &TouchQueue<K>) {
        for key in touches.drain() {
            if let Some(count) = counters.get_mut(&key) {
                *count += 1;
            }
        }
    }

    fn record_touch(&self, key: K) {
        let mut key = key;
        loop {
            match self.touches.offer(key) {
                Ok(()) => return,
                Err(rejected) => {
                    key = rejected;
                    Self::apply_touches(&mut self.counters.lock(), &self.touches);
                }
            }
        }
    }
}

impl<K, V> Cache<K, V> for LfuCache<K, V>
where
    K: Clone + Eq + Hash + Send + Sync,
    V: Send + Sync,
{
    fn get(&self, key: &K) -> Result<(Arc<V>, Expiry), GetError<V>> {
        let hit = self.store.get(key)?;
        self.record_touch(key.clone());
        Ok(hit)
    }

    fn set(&self, key: K, value: Arc<V>, expires: Expiry) -> Result<(), CacheFull> {
        let mut counters = self.counters.lock();
        Self::apply_touches(&mut counters, &self.touches);

        if self.store.set(key.clone(), value.clone(), expires).is_ok() {
            counters.entry(key).or_insert(0);
            return Ok(());
        }

        // Rank residents coldest-first; ties keep map iteration order.
        let mut ranked: Vec<(K, u64)> = counters
            .iter()
            .map(|(key, &count)| (key.clone(), count))
            .collect();
        ranked.sort_by_key(|&(_, count)| count);

        for (victim, _) in ranked {
            counters.remove(&victim);
            self.store.evict(std::slice::from_ref(&victim));
            if self.store.set(key.clone(), value.clone(), expires).is_ok() {
                counters.entry(key).or_insert(0);
                return Ok(());
            }
        }
        Err(CacheFull)
    }

    fn evict(&self, keys: &[K]) -> usize {
        let mut counters = self.counters.lock();
        Self::apply_touches(&mut counters, &self.touches);
        for key in keys {
            counters.remove(key);
        }
        self.store.evict(keys)
    }

    fn trim(&self, now: SystemTime) -> Vec<K> {
        let mut counters = self.counters.lock();
        Self::apply_touches(&mut counters, &self.touches);
        let stale = self.store.trim(now);
        for key in &stale {
            counters.remove(key);
        }
        stale
    }

    fn len(&self) -> usize {
        self.store.len()
    }

    fn capacity(&self) -> usize {
        self.store.capacity()
    }

    fn metrics(&self) -> MetricsSnapshot {
        self.store.metrics()
    }
}
