//! Eviction policies layered over the store.
//!
//! Each policy cache owns a private [`Store`](crate::store::Store) plus an
//! auxiliary order structure behind a single policy mutex. Lock order is
//! always policy index, then store; no policy lock is ever held while
//! calling user code.

pub mod fifo;
pub mod lfu;
pub mod lru;
pub mod ttl;

pub use fifo::FifoCache;
pub use lfu::LfuCache;
pub use lru::LruCache;
pub use ttl::TtlCache;
