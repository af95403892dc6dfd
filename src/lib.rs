//! cachefront: eviction-policy caches with a single-flight read-through front.
//!
//! A capacity-bounded [`store::Store`] sits under four interchangeable
//! eviction policies (FIFO, LRU, LFU, TTL). The [`upstream`] module wraps a
//! user-supplied data source in a per-key single-flight coalescer and
//! composes it with any cache into a read-through proxy.

pub mod ds;
pub mod policy;
pub mod store;
pub mod upstream;

pub mod builder;
pub mod error;
pub mod expiry;
pub mod metrics;
pub mod prelude;
pub mod traits;
