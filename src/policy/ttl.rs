//! Shortest-time-to-live eviction.
//!
//! Keeps a score per resident key — the deadline as nanoseconds since the
//! epoch, with never-expiring entries scored at `u128::MAX`. A `set` that
//! hits capacity sorts the scores ascending and evicts from the
//! soonest-to-expire end until the insert fits, so a never-expiring entry
//! is only ever chosen once every finite deadline is gone.
//!
//! `get` is a pure store passthrough: access has no effect on expiry
//! order, so there is no pending-touch machinery here.

use std::hash::Hash;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::error::{CacheFull, GetError};
use crate::expiry::Expiry;
use crate::metrics::MetricsSnapshot;
use crate::store::Store;
use crate::traits::Cache;

/// Cache that evicts the soonest-to-expire entry when full.
#[derive(Debug)]
pub struct TtlCache<K, V> {
    store: Store<K, V>,
    scores: Mutex<FxHashMap<K, u128>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates a TTL cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            store: Store::new(capacity),
            scores: Mutex::new(FxHashMap::with_capacity_and_hasher(
                capacity,
                Default::default(),
            )),
        }
    }
}

impl<K, V> Cache<K, V> for TtlCache<K, V>
where
    K: Clone + Eq + Hash + Send + Sync,
    V: Send + Sync,
{
    fn get(&self, key: &K) -> Result<(Arc<V>, Expiry), GetError<V>> {
        self.store.get(key)
    }

    fn set(&self, key: K, value: Arc<V>, expires: Expiry) -> Result<(), CacheFull> {
        let mut scores = self.scores.lock();

        if self.store.set(key.clone(), value.clone(), expires).is_ok() {
            scores.insert(key, expires.score());
            return Ok(());
        }

        // Rank residents soonest-to-expire first.
        let mut ranked: Vec<(K, u128)> = scores
            .iter()
            .map(|(key, &score)| (key.clone(), score))
            .collect();
        ranked.sort_by_key(|&(_, score)| score);

        for (victim, _) in ranked {
            scores.remove(&victim);
            self.store.evict(std::slice::from_ref(&victim));
            if self.store.set(key.clone(), value.clone(), expires).is_ok() {
                scores.insert(key, expires.score());
                return Ok(());
            }
        }
        Err(CacheFull)
    }

    fn evict(&self, keys: &[K]) -> usize {
        let mut scores = self.scores.lock();
        for key in keys {
            scores.remove(key);
        }
        self.store.evict(keys)
    }

    fn trim(&self, now: SystemTime) -> Vec<K> {
        let mut scores = self.scores.lock();
        let stale = self.store.trim(now);
        for key in &stale {
            scores.remove(key);
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
