//! Error types for the cachefront library.
//!
//! ## Key Components
//!
//! - [`GetError`]: Returned by `get` for absent or stale entries. The
//!   `Expired` variant still surfaces the stored value; the entry itself is
//!   retained until `trim`, `evict`, or a capacity eviction removes it.
//! - [`CacheFull`]: Returned by `set` when a store at capacity cannot make
//!   room. Policied caches absorb this by evicting; it escapes them only
//!   when there is structurally nothing left to evict.
//! - [`UpstreamError`]: Cloneable pass-through wrapper for errors produced
//!   by a user-supplied upstream, so a single outcome can be shared by
//!   every coalesced waiter.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

use crate::expiry::Expiry;

// ---------------------------------------------------------------------------
// GetError
// ---------------------------------------------------------------------------

/// Error returned by a failed cache lookup.
///
/// Both variants count as a miss. `Debug` and `Display` never format the
/// stored value, so no bounds are required on `V`.
pub enum GetError<V> {
    /// The key is not resident.
    KeyNotFound,
    /// The key is resident but its deadline has passed. The stored value
    /// and deadline are surfaced; the entry stays in the store.
    Expired {
        /// The stale value.
        value: Arc<V>,
        /// The deadline that has passed.
        expires: Expiry,
    },
}

impl<V> GetError<V> {
    /// Returns `true` for the `KeyNotFound` variant.
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, GetError::KeyNotFound)
    }

    /// Returns `true` for the `Expired` variant.
    pub fn is_expired(&self) -> bool {
        matches!(self, GetError::Expired { .. })
    }

    /// Returns the stale value carried by an `Expired` error.
    pub fn stale_value(&self) -> Option<&Arc<V>> {
        match self {
            GetError::KeyNotFound => None,
            GetError::Expired { value, .. } => Some(value),
        }
    }
}

impl<V> fmt::Debug for GetError<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GetError::KeyNotFound => f.write_str("KeyNotFound"),
            GetError::Expired { expires, .. } => {
                f.debug_struct("Expired").field("expires", expires).finish()
            }
        }
    }
}

impl<V> fmt::Display for GetError<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GetError::KeyNotFound => f.write_str("key not found"),
            GetError::Expired { .. } => f.write_str("entry expired"),
        }
    }
}

impl<V> Error for GetError<V> {}

// ---------------------------------------------------------------------------
// CacheFull
// ---------------------------------------------------------------------------

/// Error returned when inserting a new key into a cache at capacity.
///
/// Updates to resident keys never trigger this error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheFull;

impl fmt::Display for CacheFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("cache full")
    }
}

impl Error for CacheFull {}

// ---------------------------------------------------------------------------
// UpstreamError
// ---------------------------------------------------------------------------

/// Error produced by an upstream fetch, delivered verbatim to every waiter
/// that joined the coalesced call.
#[derive(Clone)]
pub struct UpstreamError(Arc<dyn Error + Send + Sync + 'static>);

impl UpstreamError {
    /// Wraps any error type.
    pub fn new(source: impl Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(source))
    }

    /// Creates an error from a plain message.
    pub fn message(text: impl Into<String>) -> Self {
        Self(Arc::new(Message(text.into())))
    }

    /// Returns the wrapped error.
    pub fn source_error(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.0.as_ref()
    }
}

impl fmt::Debug for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("UpstreamError").field(&self.0).finish()
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "upstream error: {}", self.0)
    }
}

impl Error for UpstreamError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.0.as_ref() as &(dyn Error + 'static))
    }
}

#[derive(Debug)]
struct Message(String);

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Error for Message {}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
