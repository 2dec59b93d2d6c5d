//! Interrupt requests and safepoint polling
//!
//! Any thread may enqueue an interrupt callback against an engine context; the
//! owning thread runs pending callbacks at its next safepoint poll, inside its
//! own execution context, then resumes where it was. The poll fast path is a
//! single atomic load so it can sit on loop back-edges and call boundaries
//! without measurable cost.

use crate::context::EngineContext;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

/// Callback run on the owning thread at its next safepoint.
pub type InterruptCallback = Box<dyn FnOnce(&EngineContext) + Send + 'static>;

/// Pending-interrupt queue for one engine context.
pub(crate) struct InterruptQueue {
    /// Fast-path flag: any callbacks queued?
    pending: AtomicBool,

    /// Queued callbacks, in request order
    queue: Mutex<Vec<InterruptCallback>>,
}

impl InterruptQueue {
    pub(crate) fn new() -> Self {
        Self {
            pending: AtomicBool::new(false),
            queue: Mutex::new(Vec::new()),
        }
    }

    /// Enqueue a callback and raise the pending flag.
    pub(crate) fn push(&self, callback: InterruptCallback) {
        let mut queue = self.queue.lock();
        queue.push(callback);
        // Publish while still holding the lock so a concurrent drain cannot
        // clear the flag between our push and our store.
        self.pending.store(true, Ordering::Release);
    }

    /// Fast check for queued callbacks (single atomic load).
    #[inline(always)]
    pub(crate) fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Take every queued callback and clear the pending flag.
    ///
    /// Callbacks queued after the swap are picked up by a later poll.
    pub(crate) fn drain(&self) -> Vec<InterruptCallback> {
        let mut queue = self.queue.lock();
        let callbacks = std::mem::take(&mut *queue);
        self.pending.store(false, Ordering::Release);
        callbacks
    }
}
