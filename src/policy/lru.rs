//! Least-recently-used eviction.
//!
//! ## Architecture
//!
//! ```text
//!   ┌────────────────────────────────────────────────────────────────┐
//!   │                        LruCache<K, V>                          │
//!   │                                                                │
//!   │   get hit ──► TouchQueue<K> (bounded, lock-free offer)         │
//!   │                    │ drained by every mutator, and by a        │
//!   │                    │ reader that finds the queue full          │
//!   │                    ▼                                           │
//!   │   Mutex<LruIndex>                                              │
//!   │   ┌──────────────────────────────────────────────────────────┐ │
//!   │   │  KeyList<K>:  head ─► [MRU] ◄──► [LRU] ◄─ tail           │ │
//!   │   │  FxHashMap<K, NodeId>                                    │ │
//!   │   └──────────────────────────────────────────────────────────┘ │
//!   │                                                                │
//!   │   Store<K, V>  (entries live here)                             │
//!   └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A `get` hit does not take the policy lock on the happy path: it offers
//! the key to a bounded touch queue and returns. The queue is drained —
//! applying each touch as a move-to-front — before every mutator runs and
//! whenever a reader finds it full, so ordering decisions always reflect
//! all reads that completed before the mutator began, and no touch is ever
//! lost.
//!
//! Recency events are `get` hits, `set` updates, and first insertion —
//! a fresh key enters at the front. A `get` that finds an expired entry
//! does not count.

use std::hash::Hash;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::{KeyList, NodeId, TouchQueue};
use crate::error::{CacheFull, GetError};
use crate::expiry::Expiry;
use crate::metrics::MetricsSnapshot;
use crate::store::Store;
use crate::traits::Cache;

#[derive(Debug)]
struct LruIndex<K> {
    order: KeyList<K>,
    nodes: FxHashMap<K, NodeId>,
}

impl<K> LruIndex<K>
where
    K: Clone + Eq + Hash,
{
    /// Applies queued touches in arrival order.
    fn apply_touches(&mut self, touches: &TouchQueue<K>) {
        for key in touches.drain() {
            if let Some(&id) = self.nodes.get(&key) {
                self.order.move_to_front(id);
            }
        }
    }
}

/// Cache that evicts the least-recently-accessed entry when full.
#[derive(Debug)]
pub struct LruCache<K, V> {
    store: Store<K, V>,
    index: Mutex<LruIndex<K>>,
    touches: TouchQueue<K>,
}

impl<K, V> LruCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates an LRU cache holding at most `capacity` entries.
    ///
    /// The pending-touch queue is sized to the capacity, so at most one
    /// drain per `capacity` hits happens on the read path.
    pub fn new(capacity: usize) -> Self {
        Self {
            store: Store::new(capacity),
            index: Mutex::new(LruIndex {
                order: KeyList::with_capacity(capacity),
                nodes: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            }),
            touches: TouchQueue::with_capacity(capacity),
        }
    }

    /// Applies all pending touches to the recency order now.
    ///
    /// Mutators do this implicitly; `flush` exists for callers that want
    /// the order list settled before inspecting or snapshotting.
    pub fn flush(&self) {
        self.index.lock().apply_touches(&self.touches);
    }

    fn record_touch(&self, key: K) {
        let mut key = key;
        loop {
            match self.touches.offer(key) {
                Ok(()) => return,
                Err(rejected) => {
                    key = rejected;
                    self.index.lock().apply_touches(&self.touches);
                }
            }
        }
    }
}

impl<K, V> Cache<K, V> for LruCache<K, V>
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
        let mut index = self.index.lock();
        index.apply_touches(&self.touches);
        loop {
            match self.store.set(key.clone(), value.clone(), expires) {
                Ok(()) => break,
                Err(CacheFull) => {
                    let Some(victim) = index.order.pop_back() else {
                        return Err(CacheFull);
                    };
                    index.nodes.remove(&victim);
                    self.store.evict(std::slice::from_ref(&victim));
                }
            }
        }
        match index.nodes.get(&key) {
            Some(&id) => {
                // An update counts as an access.
                index.order.move_to_front(id);
            }
            None => {
                let id = index.order.push_front(key.clone());
                index.nodes.insert(key, id);
            }
        }
        Ok(())
    }

    fn evict(&self, keys: &[K]) -> usize {
        let mut index = self.index.lock();
        index.apply_touches(&self.touches);
        for key in keys {
            if let Some(id) = index.nodes.remove(key) {
                index.order.remove(id);
            }
        }
        self.store.evict(keys)
    }

    fn trim(&self, now: SystemTime) -> Vec<K> {
        let mut index = self.index.lock();
        index.apply_touches(&self.touches);
        let stale = self.store.trim(now);
        for key in &stale {
            if let Some(id) = index.nodes.remove(key) {
                index.order.remove(id);
            }
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
