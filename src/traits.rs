//! The cache contract.
//!
//! Every cache in this crate — the bare [`Store`](crate::store::Store) and
//! all four policy caches — implements the same [`Cache`] trait, so callers
//! and the factory can treat them interchangeably.
//!
//! ## Architecture
//!
//! ```text
//!   caller ──► Proxy::fetch(k) ──► Cache::get(k) ──► Store::get(k)
//!                 │                     │
//!                 │ miss / expired      │ hit: policy order index is
//!                 ▼                     ▼ notified (LRU/LFU touch)
//!             Blocking::fetch(k)
//!                 │ single upstream call per key
//!                 ▼
//!             Upstream::fetch(k) ──► Cache::set(k, v, exp)
//! ```
//!
//! ## Ownership Model
//!
//! Values are stored and returned as `Arc<V>`: lookups hand back a shared
//! handle that outlives any internal lock, and the single-flight coalescer
//! can deliver one fetched value to many waiters without cloning `V`.

use std::sync::Arc;
use std::time::SystemTime;

use crate::error::{CacheFull, GetError};
use crate::expiry::Expiry;
use crate::metrics::MetricsSnapshot;

/// Uniform contract over the bare store and every policy cache.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cachefront::expiry::Expiry;
/// use cachefront::store::Store;
/// use cachefront::traits::Cache;
///
/// let store: Store<&str, i32> = Store::new(2);
/// store.set("answer", Arc::new(42), Expiry::never()).unwrap();
/// let (value, _) = store.get(&"answer").unwrap();
/// assert_eq!(*value, 42);
/// ```
pub trait Cache<K, V>: Send + Sync {
    /// Looks up a key.
    ///
    /// Returns the value and its deadline if the entry is resident and
    /// fresh. An absent key yields [`GetError::KeyNotFound`]; a resident
    /// but stale entry yields [`GetError::Expired`] with the stored value
    /// surfaced. Both failures count as a miss; the stale entry is retained
    /// until `trim`, `evict`, or a capacity eviction removes it.
    fn get(&self, key: &K) -> Result<(Arc<V>, Expiry), GetError<V>>;

    /// Inserts or updates an entry.
    ///
    /// Updating a resident key refreshes its value and deadline and never
    /// fails. Inserting a new key into a full cache evicts under the
    /// policy; the bare store (and a policy with nothing left to evict)
    /// returns [`CacheFull`] instead, without mutating.
    fn set(&self, key: K, value: Arc<V>, expires: Expiry) -> Result<(), CacheFull>;

    /// Removes the given keys and returns the new size.
    ///
    /// Keys that are not resident are skipped. An empty slice is a pure
    /// size query: nothing is removed and nothing is charged to the
    /// `evicts` counter.
    fn evict(&self, keys: &[K]) -> usize;

    /// Removes every entry whose deadline is strictly before `now` and
    /// returns the removed keys in unspecified order.
    ///
    /// This is the only operation that charges the `expired` counter.
    fn trim(&self, now: SystemTime) -> Vec<K>;

    /// Current number of resident entries, fresh or stale.
    fn len(&self) -> usize;

    /// Returns `true` if no entries are resident.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of resident entries; `0` means unbounded.
    fn capacity(&self) -> usize;

    /// Snapshot of the cache's counters.
    fn metrics(&self) -> MetricsSnapshot;
}

impl<K, V, C> Cache<K, V> for Box<C>
where
    C: Cache<K, V> + ?Sized,
{
    fn get(&self, key: &K) -> Result<(Arc<V>, Expiry), GetError<V>> {
        (**self).get(key)
    }

    fn set(&self, key: K, value: Arc<V>, expires: Expiry) -> Result<(), CacheFull> {
        (**self).set(key, value, expires)
    }

    fn evict(&self, keys: &[K]) -> usize {
        (**self).evict(keys)
    }

    fn trim(&self, now: SystemTime) -> Vec<K> {
        (**self).trim(now)
    }

    fn len(&self) -> usize {
        (**self).len()
    }

    fn capacity(&self) -> usize {
        (**self).capacity()
    }

    fn metrics(&self) -> MetricsSnapshot {
        (**self).metrics()
    }
}
