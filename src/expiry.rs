//! Entry expiration instants.
//!
//! An [`Expiry`] is an optional absolute wall-clock deadline. An absent
//! deadline means the entry never expires by time. Expired entries are
//! retained by a store until `trim`, `evict`, or a capacity eviction removes
//! them; they are simply no longer returned by `get`.
//!
//! Freshness and trimming use deliberately asymmetric comparisons:
//! an entry is fresh iff its deadline is strictly *after* `now`, while
//! `trim(now)` removes only deadlines strictly *before* `now`. A deadline
//! exactly equal to `now` is therefore stale for `get` but survives that
//! `trim` call.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Optional absolute expiration deadline for a cache entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Expiry(Option<SystemTime>);

impl Expiry {
    /// An entry that never expires by time.
    pub const fn never() -> Self {
        Self(None)
    }

    /// Expiration at an absolute instant.
    pub const fn at(deadline: SystemTime) -> Self {
        Self(Some(deadline))
    }

    /// Expiration `ttl` from now.
    pub fn after(ttl: Duration) -> Self {
        Self(Some(SystemTime::now() + ttl))
    }

    /// Returns `true` if no deadline is set.
    pub const fn is_never(&self) -> bool {
        self.0.is_none()
    }

    /// Returns the deadline, if any.
    pub const fn deadline(&self) -> Option<SystemTime> {
        self.0
    }

    /// Returns `true` if the entry may still be served at `now`.
    ///
    /// Fresh iff the deadline is absent or strictly greater than `now`.
    pub fn is_fresh_at(&self, now: SystemTime) -> bool {
        match self.0 {
            None => true,
            Some(deadline) => deadline > now,
        }
    }

    /// Returns `true` if the deadline is present and strictly before `now`.
    ///
    /// This is the `trim` predicate, not the negation of [`is_fresh_at`]:
    /// a deadline equal to `now` is stale but not yet trimmable.
    ///
    /// [`is_fresh_at`]: Expiry::is_fresh_at
    pub fn expired_before(&self, now: SystemTime) -> bool {
        match self.0 {
            None => false,
            Some(deadline) => deadline < now,
        }
    }

    /// Eviction score: nanoseconds since the Unix epoch, or `u128::MAX` for
    /// a never-expiring entry. Smaller scores expire sooner.
    pub fn score(&self) -> u128 {
        match self.0 {
            None => u128::MAX,
            Some(deadline) => deadline
                .duration_since(UNIX_EPOCH)
                .map(|since| since.as_nanos())
                .unwrap_or(0),
        }
    }
}

impl From<SystemTime> for Expiry {
    fn from(deadline: SystemTime) -> Self {
        Self::at(deadline)
    }
}

impl From<Option<SystemTime>> for Expiry {
    fn from(deadline: Option<SystemTime>) -> Self {
        Self(deadline)
    }
}
