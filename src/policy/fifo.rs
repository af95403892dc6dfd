//! First-in-first-out eviction.
//!
//! ## Architecture
//!
//! ```text
//!   ┌───────────────────────────────────────────────────────────┐
//!   │                     FifoCache<K, V>                       │
//!   │                                                           │
//!   │   Mutex<FifoIndex>                                        │
//!   │   ┌─────────────────────────────────────────────────────┐ │
//!   │   │  KeyList<K>:  head ─► [newest] ◄──► [oldest] ◄─ tail│ │
//!   │   │  FxHashMap<K, NodeId> for O(1) splice by key        │ │
//!   │   └─────────────────────────────────────────────────────┘ │
//!   │                                                           │
//!   │   Store<K, V>  (entries live here)                        │
//!   └───────────────────────────────────────────────────────────┘
//! ```
//!
//! New keys are pushed to the front of the insertion list; the victim is
//! always the back, the oldest still-resident key. Neither `get` hits nor
//! updates reorder the list — position is fixed at first insertion.

use std::hash::Hash;
use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use crate::ds::{KeyList, NodeId};
use crate::error::{CacheFull, GetError};
use crate::expiry::Expiry;
use crate::metrics::MetricsSnapshot;
use crate::store::Store;
use crate::traits::Cache;

#[derive(Debug)]
struct FifoIndex<K> {
    order: KeyList<K>,
    nodes: FxHashMap<K, NodeId>,
}

/// Cache that evicts the oldest-inserted entry when full.
#[derive(Debug)]
pub struct FifoCache<K, V> {
    store: Store<K, V>,
    index: Mutex<FifoIndex<K>>,
}

impl<K, V> FifoCache<K, V>
where
    K: Clone + Eq + Hash,
{
    /// Creates a FIFO cache holding at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            store: Store::new(capacity),
            index: Mutex::new(FifoIndex {
                order: KeyList::with_capacity(capacity),
                nodes: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            }),
        }
    }
}

impl<K, V> Cache<K, V> for FifoCache<K, V>
where
    K: Clone + Eq + Hash + Send + Sync,
    V: Send + Sync,
{
    fn get(&self, key: &K) -> Result<(Arc<V>, Expiry), GetError<V>> {
        self.store.get(key)
    }

    fn set(&self, key: K, value: Arc<V>, expires: Expiry) -> Result<(), CacheFull> {
        let mut index = self.index.lock();
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
        if !index.nodes.contains_key(&key) {
            let id = index.order.push_front(key.clone());
            index.nodes.insert(key, id);
        }
        Ok(())
    }

    fn evict(&self, keys: &[K]) -> usize {
        let mut index = self.index.lock();
        for key in keys {
            if let Some(id) = index.nodes.remove(key) {
                index.order.remove(id);
            }
        }
        self.store.evict(keys)
    }

    fn trim(&self, now: SystemTime) -> Vec<K> {
        let mut index = self.index.lock();
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
