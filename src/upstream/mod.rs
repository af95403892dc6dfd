//! Upstream data sources and the read-through plumbing in front of them.
//!
//! An [`Upstream`] is anything that can produce a `(value, deadline)` pair
//! for a key. [`Blocking`] wraps one in a per-key single-flight coalescer;
//! [`Proxy`] composes a coalesced upstream with a cache into a
//! read-through upstream.
//!
//! ## Key Components
//! - [`Upstream`]: the fetch contract.
//! - [`UpstreamFn`]: adapter turning a closure into an upstream.
//! - [`StaticUpstream`]: fixed-map upstream, mainly a test fixture.
//! - [`Blocking`]: at-most-one concurrent fetch per key.
//! - [`Proxy`]: cache in front, coalesced upstream behind.

pub mod proxy;
pub mod single_flight;

pub use proxy::Proxy;
pub use single_flight::Blocking;

use std::hash::Hash;
use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::error::UpstreamError;
use crate::expiry::Expiry;

/// Result of one upstream fetch: a shared value and its deadline, or a
/// cloneable error. Either way the outcome can be handed to every waiter
/// of a coalesced call.
pub type FetchOutcome<V> = Result<(Arc<V>, Expiry), UpstreamError>;

/// A source of values for cache misses.
///
/// Implementations may block for arbitrarily long; no lock in this crate
/// is ever held across a `fetch` call.
pub trait Upstream<K, V>: Send + Sync {
    /// Produces the value and deadline for `key`.
    fn fetch(&self, key: &K) -> FetchOutcome<V>;
}

/// Adapter turning any `Fn(&K) -> FetchOutcome<V>` into an [`Upstream`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use cachefront::expiry::Expiry;
/// use cachefront::upstream::{Upstream, UpstreamFn};
///
/// let upstream = UpstreamFn::new(|key: &u32| Ok((Arc::new(key * 2), Expiry::never())));
/// let (value, _) = upstream.fetch(&21).unwrap();
/// assert_eq!(*value, 42);
/// ```
#[derive(Debug)]
pub struct UpstreamFn<F>(F);

impl<F> UpstreamFn<F> {
    /// Wraps a fetch closure.
    pub fn new(fetch: F) -> Self {
        Self(fetch)
    }
}

impl<K, V, F> Upstream<K, V> for UpstreamFn<F>
where
    F: Fn(&K) -> FetchOutcome<V> + Send + Sync,
{
    fn fetch(&self, key: &K) -> FetchOutcome<V> {
        (self.0)(key)
    }
}

/// Upstream backed by a fixed map; keys outside the map are an error.
#[derive(Debug)]
pub struct StaticUpstream<K, V>(FxHashMap<K, Arc<V>>);

impl<K, V> StaticUpstream<K, V>
where
    K: Eq + Hash,
{
    /// Builds the upstream from `(key, value)` pairs.
    pub fn new(entries: impl IntoIterator<Item = (K, V)>) -> Self {
        Self(
            entries
                .into_iter()
                .map(|(key, value)| (key, Arc::new(value)))
                .collect(),
        )
    }
}

impl<K, V> Upstream<K, V> for StaticUpstream<K, V>
where
    K: Eq + Hash + Send + Sync,
    V: Send + Sync,
{
    fn fetch(&self, key: &K) -> FetchOutcome<V> {
        match self.0.get(key) {
            Some(value) => Ok((value.clone(), Expiry::never())),
            None => Err(UpstreamError::message("no upstream value for key")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_fn_delegates() {
        let upstream = UpstreamFn::new(|key: &&str| {
            Ok((Arc::new(key.len()), Expiry::never()))
        });
        let (value, expires) = upstream.fetch(&"four").unwrap();
        assert_eq!(*value, 4);
        assert!(expires.is_never());
    }

    #[test]
    fn static_upstream_serves_known_keys() {
        let upstream = StaticUpstream::new([("a", 1), ("b", 2)]);
        assert_eq!(*upstream.fetch(&"a").unwrap().0, 1);
        assert_eq!(*upstream.fetch(&"b").unwrap().0, 2);
        assert!(upstream.fetch(&"c").is_err());
    }
}
