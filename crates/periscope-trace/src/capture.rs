//! Snapshot capture protocol
//!
//! A capture cannot walk another thread's stack directly; the stack belongs
//! to a live, possibly-running engine. Instead the requester asks the target
//! context to run a callback at its next safepoint. The callback walks the
//! live stack on the target thread, sanitizes every frame, and settles a
//! one-shot channel the requester is blocked on. The target then resumes
//! exactly where it was; it is never unwound or suspended by this subsystem.

use crate::error::{TraceError, TraceResult};
use crate::frame::StackFrame;
use crossbeam::channel::{self, Sender};
use periscope_engine::EngineContext;
use std::sync::Arc;
use std::time::Duration;

/// Maximum frames walked per capture.
pub const MAX_CAPTURE_FRAMES: usize = 255;

/// One engine instance's call stack, innermost first, at its pause point.
///
/// An empty result is valid: the target had no capturable stack.
pub type CaptureResult = Vec<StackFrame>;

/// Issue the interrupt whose callback walks, sanitizes, and settles.
fn request_capture(target: &Arc<EngineContext>, slot: Sender<CaptureResult>) {
    target.request_interrupt(move |ctx| {
        let result: CaptureResult = ctx
            .stack_trace(MAX_CAPTURE_FRAMES)
            .iter()
            .map(StackFrame::sanitize)
            .collect();
        tracing::trace!(engine = ?ctx.id(), frames = result.len(), "capture settled");
        // Receiver may already have given up (bounded wait); nothing to do then.
        let _ = slot.send(result);
    });
}

/// Capture the target's call stack at its next safepoint.
///
/// Safe to call from any thread other than the target's owner. Blocks until
/// the target services the interrupt; there is no timeout and no
/// cancellation, so a target that never reaches a safepoint blocks the
/// caller indefinitely. Use [`capture_deadline`] for a bounded wait.
pub fn capture(target: &Arc<EngineContext>) -> CaptureResult {
    let (slot, wait) = channel::bounded(1);
    request_capture(target, slot);

    // The sender lives inside the target's interrupt queue and our strong
    // handle keeps that queue alive, so recv only returns once the callback
    // has settled the slot. A disconnect would mean that invariant broke.
    match wait.recv() {
        Ok(result) => result,
        Err(_) => {
            tracing::debug!(
                engine = ?target.id(),
                "capture slot disconnected before settling; reporting an empty stack"
            );
            CaptureResult::new()
        }
    }
}

/// Bounded-wait variant of [`capture`].
///
/// Identical target-side behavior; the requester gives up after `deadline`
/// with [`TraceError::DeadlineExceeded`]. The interrupt stays queued and is
/// still serviced (and discarded) whenever the target next polls.
pub fn capture_deadline(
    target: &Arc<EngineContext>,
    deadline: Duration,
) -> TraceResult<CaptureResult> {
    let (slot, wait) = channel::bounded(1);
    request_capture(target, slot);

    wait.recv_timeout(deadline)
        .map_err(|_| TraceError::DeadlineExceeded(deadline))
}
