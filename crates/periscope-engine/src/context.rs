//! Engine contexts
//!
//! An `EngineContext` is one independent execution context with its own live
//! script stack, owned by exactly one worker thread. Other threads hold it
//! through `Arc` and may request interrupts against it; the owner services
//! them at safepoints via [`EngineContext::poll`].

use crate::interrupt::InterruptQueue;
use crate::stack::{FrameInfo, ScriptStack};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Unique identifier for an engine context.
///
/// Allocated from a process-global counter; never reused within a process.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct EngineId(u64);

impl EngineId {
    /// Allocate a new unique engine ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(1);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for EngineId {
    fn default() -> Self {
        Self::new()
    }
}

/// Hook run exactly once when the owning context is torn down.
pub type TeardownHook = Box<dyn FnOnce(EngineId) + Send + 'static>;

/// One execution engine instance.
///
/// The owning thread drives the script stack (push/pop on function entry and
/// exit) and polls for interrupts at safepoints. Teardown hooks fire when the
/// last handle is dropped; interrupts still queued at that point are discarded
/// without running.
pub struct EngineContext {
    id: EngineId,
    stack: ScriptStack,
    interrupts: InterruptQueue,
    teardown: Mutex<Vec<TeardownHook>>,
}

impl EngineContext {
    /// Create a fresh context with an empty stack.
    pub fn new() -> Self {
        Self {
            id: EngineId::new(),
            stack: ScriptStack::new(),
            interrupts: InterruptQueue::new(),
            teardown: Mutex::new(Vec::new()),
        }
    }

    /// This context's identity.
    pub fn id(&self) -> EngineId {
        self.id
    }

    /// The live script stack.
    pub fn stack(&self) -> &ScriptStack {
        &self.stack
    }

    /// Push a frame on function entry. Owner thread only.
    pub fn push_frame(&self, frame: FrameInfo) {
        self.stack.push(frame);
    }

    /// Pop the innermost frame on function exit. Owner thread only.
    pub fn pop_frame(&self) -> Option<FrameInfo> {
        self.stack.pop()
    }

    /// Walk up to `max_frames` live frames, innermost first.
    pub fn stack_trace(&self, max_frames: usize) -> Vec<FrameInfo> {
        self.stack.trace(max_frames)
    }

    /// Request that `callback` run on the owning thread at its next safepoint.
    ///
    /// Safe to call from any thread. The callback runs synchronously inside
    /// the owner's execution context with full access to the live stack. If
    /// the owner never polls again the callback is dropped at teardown.
    pub fn request_interrupt<F>(&self, callback: F)
    where
        F: FnOnce(&EngineContext) + Send + 'static,
    {
        self.interrupts.push(Box::new(callback));
        tracing::trace!(engine = ?self.id, "interrupt requested");
    }

    /// Safepoint poll, called by the owning thread.
    ///
    /// Fast path is a single atomic load; when interrupts are pending the
    /// slow path drains and runs them all, then execution resumes exactly
    /// where it was.
    #[inline(always)]
    pub fn poll(&self) {
        if self.interrupts.is_pending() {
            self.service_interrupts();
        }
    }

    /// Slow path: run every pending interrupt callback.
    #[cold]
    #[inline(never)]
    fn service_interrupts(&self) {
        let callbacks = self.interrupts.drain();
        tracing::trace!(engine = ?self.id, count = callbacks.len(), "servicing interrupts");
        for callback in callbacks {
            callback(self);
        }
    }

    /// Register a hook to run when this context is torn down.
    ///
    /// Hooks run in registration order, exactly once, on whichever thread
    /// drops the last handle.
    pub fn on_teardown<F>(&self, hook: F)
    where
        F: FnOnce(EngineId) + Send + 'static,
    {
        self.teardown.lock().push(Box::new(hook));
    }
}

impl Default for EngineContext {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for EngineContext {
    fn drop(&mut self) {
        let hooks = std::mem::take(&mut *self.teardown.lock());
        for hook in hooks {
            hook(self.id);
        }
    }
}
