//! Cache activity counters.
//!
//! Every cache tracks four monotonic counters plus a live-size gauge. The
//! hot-path counters (`hits`, `misses`) are relaxed atomics bumped without
//! the map's write lock; `evicts` and `expired` are only ever bumped by
//! mutators that already hold it.

use std::sync::atomic::{AtomicU64, Ordering};

/// Point-in-time view of a cache's counters.
///
/// `hits`, `misses`, `evicts`, and `expired` are cumulative since cache
/// creation. `items` is the live entry count at snapshot time and may be
/// stale by the time it is read under concurrent mutation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    /// Lookups that returned a fresh value.
    pub hits: u64,
    /// Lookups that found nothing usable (absent or expired).
    pub misses: u64,
    /// Entries removed by `evict` or by policy-driven capacity eviction.
    pub evicts: u64,
    /// Entries removed by `trim`.
    pub expired: u64,
    /// Live entry count at snapshot time.
    pub items: usize,
}

/// Atomic counter block shared by the store and the policy caches.
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    evicts: AtomicU64,
    expired: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn inc_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn inc_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_evicts(&self, removed: u64) {
        self.evicts.fetch_add(removed, Ordering::Relaxed);
    }

    pub(crate) fn add_expired(&self, removed: u64) {
        self.expired.fetch_add(removed, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self, items: usize) -> MetricsSnapshot {
        MetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evicts: self.evicts.load(Ordering::Relaxed),
            expired: self.expired.load(Ordering::Relaxed),
            items,
        }
    }
}
