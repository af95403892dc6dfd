//! Policy selection and cache construction.
//!
//! The factory hides the concrete cache types behind the common
//! [`Cache`] contract: pick a [`Policy`] (or parse one from its tag) and
//! get a boxed cache back.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use cachefront::builder::{CacheBuilder, Policy};
//! use cachefront::expiry::Expiry;
//! use cachefront::traits::Cache;
//!
//! let cache = CacheBuilder::new(100)
//!     .policy(Policy::Lru)
//!     .build::<u64, String>();
//! cache.set(1, Arc::new("hello".to_string()), Expiry::never()).unwrap();
//! assert_eq!(*cache.get(&1).unwrap().0, "hello");
//! ```

use std::hash::Hash;
use std::time::Duration;

use crate::policy::{FifoCache, LfuCache, LruCache, TtlCache};
use crate::store::Store;
use crate::traits::Cache;

/// Default capacity for callers that do not have a better number.
pub const DEFAULT_MAX_ITEMS: usize = 1000;

/// Suggested cadence for calling `trim`; nothing in the library enforces
/// it, sweep scheduling belongs to the caller.
pub const DEFAULT_EXPIRE_INTERVAL: Duration = Duration::from_secs(1);

/// Available eviction policies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Policy {
    /// No eviction: the bare store, which reports `CacheFull` when bounded.
    #[default]
    None,
    /// First in, first out.
    Fifo,
    /// Least recently used.
    Lru,
    /// Least frequently used.
    Lfu,
    /// Shortest time-to-live first.
    Ttl,
}

impl Policy {
    /// Parses a policy tag; unknown tags (the empty tag included) fall
    /// back to [`Policy::None`].
    pub fn from_tag(tag: &str) -> Self {
        if tag.eq_ignore_ascii_case("fifo") {
            Policy::Fifo
        } else if tag.eq_ignore_ascii_case("lru") {
            Policy::Lru
        } else if tag.eq_ignore_ascii_case("lfu") {
            Policy::Lfu
        } else if tag.eq_ignore_ascii_case("ttl") {
            Policy::Ttl
        } else {
            Policy::None
        }
    }

    /// Canonical tag for this policy; the inverse of [`Policy::from_tag`].
    pub fn tag(&self) -> &'static str {
        match self {
            Policy::None => "",
            Policy::Fifo => "FIFO",
            Policy::Lru => "LRU",
            Policy::Lfu => "LFU",
            Policy::Ttl => "TTL",
        }
    }
}

impl std::fmt::Display for Policy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Builder for policy caches behind the [`Cache`] contract.
#[derive(Debug, Clone)]
pub struct CacheBuilder {
    capacity: usize,
    policy: Policy,
}

impl CacheBuilder {
    /// Starts a builder for a cache holding at most `capacity` entries;
    /// `0` means unbounded.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            policy: Policy::None,
        }
    }

    /// Selects the eviction policy.
    pub fn policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    /// Builds the cache.
    ///
    /// An unbounded cache never evicts, so the policy machinery would be
    /// dead weight: capacity `0` always yields the bare store.
    pub fn build<K, V>(self) -> Box<dyn Cache<K, V>>
    where
        K: Clone + Eq + Hash + Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        if self.capacity == 0 {
            return Box::new(Store::new(0));
        }
        match self.policy {
            Policy::None => Box::new(Store::new(self.capacity)),
            Policy::Fifo => Box::new(FifoCache::new(self.capacity)),
            Policy::Lru => Box::new(LruCache::new(self.capacity)),
            Policy::Lfu => Box::new(LfuCache::new(self.capacity)),
            Policy::Ttl => Box::new(TtlCache::new(self.capacity)),
        }
    }
}

/// Tag-driven shorthand for [`CacheBuilder`].
pub fn new_cache<K, V>(capacity: usize, tag: &str) -> Box<dyn Cache<K, V>>
where
    K: Clone + Eq + Hash + Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    CacheBuilder::new(capacity)
        .policy(Policy::from_tag(tag))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiry::Expiry;
    use std::sync::Arc;

    #[test]
    fn tags_round_trip() {
        for policy in [Policy::Fifo, Policy::Lru, Policy::Lfu, Policy::Ttl] {
            assert_eq!(Policy::from_tag(policy.tag()), policy);
        }
        assert_eq!(Policy::from_tag("lru"), Policy::Lru);
    }

    #[test]
    fn unknown_tags_fall_back_to_none() {
        assert_eq!(Policy::from_tag(""), Policy::None);
        assert_eq!(Policy::from_tag("ARC"), Policy::None);
        assert_eq!(Policy::from_tag("random"), Policy::None);
    }

    #[test]
    fn every_policy_builds_a_working_cache() {
        for policy in [
            Policy::None,
            Policy::Fifo,
            Policy::Lru,
            Policy::Lfu,
            Policy::Ttl,
        ] {
            let cache = CacheBuilder::new(10).policy(policy).build::<u64, String>();
            cache
                .set(1, Arc::new("one".to_string()), Expiry::never())
                .unwrap();
            assert_eq!(*cache.get(&1).unwrap().0, "one", "policy {policy:?}");
            assert_eq!(cache.len(), 1);
            assert_eq!(cache.capacity(), 10);
            assert_eq!(cache.metrics().hits, 1);
        }
    }

    #[test]
    fn policied_caches_evict_instead_of_failing() {
        for policy in [Policy::Fifo, Policy::Lru, Policy::Lfu, Policy::Ttl] {
            let cache = CacheBuilder::new(2).policy(policy).build::<u64, u64>();
            for key in 0..5 {
                cache.set(key, Arc::new(key), Expiry::never()).unwrap();
            }
            assert_eq!(cache.len(), 2, "policy {policy:?}");
            assert_eq!(cache.metrics().evicts, 3, "policy {policy:?}");
        }
    }

    #[test]
    fn bare_store_surfaces_cache_full() {
        let cache = new_cache::<u64, u64>(1, "");
        cache.set(1, Arc::new(1), Expiry::never()).unwrap();
        assert!(cache.set(2, Arc::new(2), Expiry::never()).is_err());
    }

    #[test]
    fn zero_capacity_is_unbounded_for_any_policy() {
        let cache = new_cache::<u64, u64>(0, "LRU");
        for key in 0..(DEFAULT_MAX_ITEMS as u64 + 1) {
            cache.set(key, Arc::new(key), Expiry::never()).unwrap();
        }
        assert_eq!(cache.len(), DEFAULT_MAX_ITEMS + 1);
        assert_eq!(cache.capacity(), 0);
    }
}
