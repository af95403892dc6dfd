//! Bounded queue of deferred access notifications.
//!
//! LRU and LFU record `get` hits off the hot path: the reader offers the
//! touched key to this queue without blocking and without the policy lock.
//! Mutators (and readers that find the queue full) drain it under the
//! policy lock and apply the accumulated touches in arrival order.
//!
//! Built on a bounded `crossbeam-channel`: `offer` is a `try_send` that
//! hands the key back on a full queue, `drain` is a `try_recv` loop. A
//! full queue therefore never grows and never blocks a reader for longer
//! than one drain.

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// Bounded multi-producer queue of pending touches.
#[derive(Debug)]
pub struct TouchQueue<T> {
    tx: Sender<T>,
    rx: Receiver<T>,
}

impl<T> TouchQueue<T> {
    /// Creates a queue holding up to `capacity` pending touches.
    ///
    /// A zero capacity is clamped to one slot so that `offer` after a
    /// drain can always succeed.
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, rx) = bounded(capacity.max(1));
        Self { tx, rx }
    }

    /// Attempts to enqueue without blocking.
    ///
    /// Returns the value back to the caller when the queue is full; the
    /// caller is expected to drain under its lock and retry.
    pub fn offer(&self, value: T) -> Result<(), T> {
        match self.tx.try_send(value) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(value)) | Err(TrySendError::Disconnected(value)) => Err(value),
        }
    }

    /// Drains every pending touch in arrival order without blocking.
    pub fn drain(&self) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(move || self.rx.try_recv().ok())
    }

    /// Number of touches currently queued.
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    /// Returns `true` if no touches are queued.
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
