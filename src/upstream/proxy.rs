//! Read-through composition of a cache and a coalesced upstream.
//!
//! A [`Proxy`] is itself an [`Upstream`]: a fetch first consults the
//! cache, and only a miss or an expired entry reaches the wrapped source.
//! The inner upstream is always run through [`Blocking`], so a stampede of
//! fetches for one cold key turns into a single upstream call; the result
//! populates the cache on the way out.
//!
//! Upstream errors are returned as-is and never populate the cache, so
//! the next fetch tries again. A `CacheFull` surfaced by the cache on the
//! way back — possible only when the policy had nothing left to evict —
//! skips the insert rather than failing the fetch.

use std::hash::Hash;

use super::{Blocking, FetchOutcome, Upstream};
use crate::error::GetError;
use crate::traits::Cache;

/// Read-through upstream: cache in front, single-flight source behind.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cachefront::expiry::Expiry;
/// use cachefront::store::Store;
/// use cachefront::traits::Cache;
/// use cachefront::upstream::{Proxy, Upstream, UpstreamFn};
///
/// let upstream = UpstreamFn::new(|key: &u32| Ok((Arc::new(key * 2), Expiry::never())));
/// let proxy = Proxy::new(upstream, Store::new(16));
///
/// assert_eq!(*proxy.fetch(&21).unwrap().0, 42);
/// // Served from the cache this time.
/// assert_eq!(*proxy.fetch(&21).unwrap().0, 42);
/// assert_eq!(proxy.cache().metrics().hits, 1);
/// ```
#[derive(Debug)]
pub struct Proxy<K, V, U, C> {
    upstream: Blocking<K, V, U>,
    cache: C,
}

impl<K, V, U, C> Proxy<K, V, U, C>
where
    K: Clone + Eq + Hash,
{
    /// Composes an upstream and a cache; the upstream is wrapped in the
    /// single-flight coalescer.
    pub fn new(upstream: U, cache: C) -> Self {
        Self {
            upstream: Blocking::new(upstream),
            cache,
        }
    }

    /// Returns the cache in front of the upstream.
    pub fn cache(&self) -> &C {
        &self.cache
    }
}

impl<K, V, U, C> Upstream<K, V> for Proxy<K, V, U, C>
where
    K: Clone + Eq + Hash + Send + Sync,
    V: Send + Sync,
    U: Upstream<K, V>,
    C: Cache<K, V>,
{
    fn fetch(&self, key: &K) -> FetchOutcome<V> {
        match self.cache.get(key) {
            Ok(hit) => Ok(hit),
            Err(GetError::KeyNotFound) | Err(GetError::Expired { .. }) => {
                let (value, expires) = self.upstream.fetch(key)?;
                // A policy cache only surfaces CacheFull when it cannot
                // evict at all; skip the insert and serve the value.
                let _ = self.cache.set(key.clone(), value.clone(), expires);
                Ok((value, expires))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpstreamError;
    use crate::expiry::Expiry;
    use crate::policy::LruCache;
    use crate::store::Store;
    use crate::upstream::UpstreamFn;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn counting_upstream(
        calls: Arc<AtomicU64>,
    ) -> UpstreamFn<impl Fn(&&'static str) -> FetchOutcome<u64> + Send + Sync> {
        UpstreamFn::new(move |_: &&'static str| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            Ok((Arc::new(n), Expiry::never()))
        })
    }

    #[test]
    fn second_fetch_is_served_from_cache() {
        let calls = Arc::new(AtomicU64::new(0));
        let proxy = Proxy::new(counting_upstream(calls.clone()), Store::new(16));

        assert_eq!(*proxy.fetch(&"k").unwrap().0, 1);
        assert_eq!(*proxy.fetch(&"k").unwrap().0, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(proxy.cache().metrics().hits, 1);
        assert_eq!(proxy.cache().metrics().misses, 1);
    }

    #[test]
    fn distinct_keys_fetch_independently() {
        let calls = Arc::new(AtomicU64::new(0));
        let proxy = Proxy::new(counting_upstream(calls.clone()), Store::new(16));

        assert_eq!(*proxy.fetch(&"a").unwrap().0, 1);
        assert_eq!(*proxy.fetch(&"b").unwrap().0, 2);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn upstream_error_does_not_populate() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let upstream = UpstreamFn::new(move |_: &&'static str| -> FetchOutcome<u64> {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(UpstreamError::message("backend down"))
        });
        let proxy = Proxy::new(upstream, Store::new(16));

        assert!(proxy.fetch(&"k").is_err());
        assert!(proxy.fetch(&"k").is_err());
        // No negative caching: each fetch reached the upstream.
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(proxy.cache().len(), 0);
    }

    #[test]
    fn expired_entry_is_refetched_and_replaced() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let upstream = UpstreamFn::new(move |_: &&'static str| {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            Ok((Arc::new(n), Expiry::never()))
        });
        let cache: Store<&str, u64> = Store::new(16);
        cache
            .set(
                "k",
                Arc::new(99),
                Expiry::at(std::time::SystemTime::now() - Duration::from_secs(1)),
            )
            .unwrap();
        let proxy = Proxy::new(upstream, cache);

        // The stale value is bypassed and overwritten.
        assert_eq!(*proxy.fetch(&"k").unwrap().0, 1);
        assert_eq!(*proxy.fetch(&"k").unwrap().0, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn works_behind_a_policy_cache() {
        let calls = Arc::new(AtomicU64::new(0));
        let counter = calls.clone();
        let upstream = UpstreamFn::new(move |key: &u32| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok((Arc::new(*key), Expiry::never()))
        });
        let proxy = Proxy::new(upstream, LruCache::new(2));

        for key in 0..4u32 {
            assert_eq!(*proxy.fetch(&key).unwrap().0, key);
        }
        // Capacity 2: the first keys were evicted and refetch.
        assert_eq!(*proxy.fetch(&0).unwrap().0, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert_eq!(proxy.cache().len(), 2);
    }

    #[test]
    fn boxed_factory_cache_plugs_in() {
        use crate::builder::new_cache;

        let calls = Arc::new(AtomicU64::new(0));
        let proxy = Proxy::new(
            counting_upstream(calls.clone()),
            new_cache::<&str, u64>(8, "LRU"),
        );
        assert_eq!(*proxy.fetch(&"k").unwrap().0, 1);
        assert_eq!(*proxy.fetch(&"k").unwrap().0, 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
