//! Per-key single-flight coalescing.
//!
//! ## Architecture
//!
//! ```text
//!   fetch(k)                     fetch(k)            fetch(k)
//!     │ leader                     │ waiter            │ waiter
//!     ▼                            ▼                   ▼
//!   ┌──────────────────────────────────────────────────────────────┐
//!   │  RwLock<FxHashMap<K, Arc<Pending>>>                          │
//!   │                                                              │
//!   │  first caller publishes a Pending and calls the upstream     │
//!   │  with no lock held; later callers find it and wait           │
//!   └──────────────────────────────────────────────────────────────┘
//!     │                            │
//!     │ outcome stored (OnceLock)  │ listen ─► re-check ─► wait
//!     │ entry removed (write lock) │
//!     │ waiters notified (Event)   ▼
//!     └─────────────────────► all callers clone the same outcome
//! ```
//!
//! The leader removes the map entry *before* signalling completion, so a
//! late arrival observes either the in-flight `Pending` (and joins it) or
//! no entry at all (and starts a fresh flight) — never a completed entry.
//! The `Pending` is shared by `Arc`, so it outlives the map entry for as
//! long as any waiter still holds it.
//!
//! If the leader unwinds inside the upstream call, a drop guard still
//! removes the entry and wakes the waiters; they observe an abandoned
//! flight with no outcome and race to start a fresh one.

use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use event_listener::{Event, Listener};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use super::{FetchOutcome, Upstream};

#[derive(Debug)]
struct Pending<V> {
    outcome: OnceLock<FetchOutcome<V>>,
    done: Event,
    abandoned: AtomicBool,
}

impl<V> Pending<V> {
    fn new() -> Self {
        Self {
            outcome: OnceLock::new(),
            done: Event::new(),
            abandoned: AtomicBool::new(false),
        }
    }
}

enum Role<V> {
    Leader(Arc<Pending<V>>),
    Waiter(Arc<Pending<V>>),
}

/// Single-flight wrapper: at most one concurrent upstream fetch per key.
///
/// Concurrent fetches of the same key join the in-flight call and all
/// receive the same `(value, deadline)` or the same error. Errors are
/// shared, not retried. Coalescing is strictly per key; distinct keys
/// never wait on each other.
#[derive(Debug)]
pub struct Blocking<K, V, U> {
    upstream: U,
    pending: RwLock<FxHashMap<K, Arc<Pending<V>>>>,
}

impl<K, V, U> Blocking<K, V, U>
where
    K: Clone + Eq + Hash,
{
    /// Wraps an upstream in the coalescer.
    pub fn new(upstream: U) -> Self {
        Self {
            upstream,
            pending: RwLock::new(FxHashMap::default()),
        }
    }

    /// Returns the wrapped upstream.
    pub fn inner(&self) -> &U {
        &self.upstream
    }

    /// Waits for the flight's outcome; `None` means the leader abandoned
    /// the flight without producing one.
    fn join(pending: &Pending<V>) -> Option<FetchOutcome<V>> {
        loop {
            if let Some(outcome) = pending.outcome.get() {
                return Some(outcome.clone());
            }
            if pending.abandoned.load(Ordering::Acquire) {
                return None;
            }
            // Register before re-checking so a signal between the check
            // and the wait cannot be missed.
            let listener = pending.done.listen();
            if let Some(outcome) = pending.outcome.get() {
                return Some(outcome.clone());
            }
            if pending.abandoned.load(Ordering::Acquire) {
                return None;
            }
            listener.wait();
        }
    }
}

/// Removes the flight from the map and wakes the waiters on drop, whether
/// the leader finished or unwound.
struct FlightGuard<'a, K, V>
where
    K: Eq + Hash,
{
    map: &'a RwLock<FxHashMap<K, Arc<Pending<V>>>>,
    key: &'a K,
    pending: &'a Pending<V>,
}

impl<K, V> Drop for FlightGuard<'_, K, V>
where
    K: Eq + Hash,
{
    fn drop(&mut self) {
        self.map.write().remove(self.key);
        if self.pending.outcome.get().is_none() {
            self.pending.abandoned.store(true, Ordering::Release);
        }
        // Removal strictly precedes the signal: a woken waiter that
        // re-fetches will not find this completed flight in the map.
        self.pending.done.notify(usize::MAX);
    }
}

impl<K, V, U> Upstream<K, V> for Blocking<K, V, U>
where
    K: Clone + Eq + Hash + Send + Sync,
    V: Send + Sync,
    U: Upstream<K, V>,
{
    fn fetch(&self, key: &K) -> FetchOutcome<V> {
        loop {
            // Fast path: join an in-flight call under the read lock.
            let existing = self.pending.read().get(key).cloned();
            if let Some(pending) = existing {
                if let Some(outcome) = Self::join(&pending) {
                    return outcome;
                }
                continue;
            }

            // Slow path: re-check under the write lock; another fetcher
            // may have raced in between the two lookups.
            let role = {
                let mut map = self.pending.write();
                match map.get(key) {
                    Some(pending) => Role::Waiter(pending.clone()),
                    None => {
                        let pending = Arc::new(Pending::new());
                        map.insert(key.clone(), pending.clone());
                        Role::Leader(pending)
                    }
                }
            };

            match role {
                Role::Waiter(pending) => {
                    if let Some(outcome) = Self::join(&pending) {
                        return outcome;
                    }
                }
                Role::Leader(pending) => {
                    let guard = FlightGuard {
                        map: &self.pending,
                        key,
                        pending: pending.as_ref(),
                    };
                    // No lock is held across the upstream call.
                    let outcome = self.upstream.fetch(key);
                    let _ = pending.outcome.set(outcome.clone());
                    drop(guard);
                    return outcome;
                }
            }
        }
    }
}
