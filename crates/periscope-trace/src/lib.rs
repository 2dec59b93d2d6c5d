//! Periscope Trace
//!
//! Cross-thread diagnostic stack snapshots for a multi-threaded runtime in
//! which every worker thread owns one independent engine context. Any thread
//! can request a point-in-time capture of every *other* live thread's script
//! call stack, without suspending, unwinding, or corrupting the targets:
//! each capture is a one-shot rendezvous through the target's own safepoint
//! interrupt mechanism.
//!
//! - **Frame sanitizer**: normalizes raw frames into displayable records
//!   (`frame` module)
//! - **Capture protocol**: interrupt request, target-side walk, one-shot
//!   settle (`capture` module)
//! - **Thread registry**: process-wide identity and liveness metadata,
//!   removed automatically at engine teardown (`registry` module)
//! - **Aggregator**: concurrent fan-out over all registered threads, joined
//!   into one name-keyed snapshot (`aggregate` module)
//! - **Service surface**: the host-callable operations over the global
//!   registry (`service` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use periscope_engine::{EngineContext, EngineWorker, FrameInfo};
//! use periscope_trace::{register_thread, capture_stack_trace};
//! use std::sync::Arc;
//!
//! let main = Arc::new(EngineContext::new());
//! register_thread(&main, "main")?;
//!
//! let worker = EngineWorker::spawn_script(
//!     "worker-1",
//!     vec![FrameInfo::call("longWork", "worker.js", 10, 29)],
//! );
//! register_thread(worker.context(), "worker-1")?;
//!
//! let snapshot = capture_stack_trace(&main);
//! assert_eq!(snapshot["worker-1"][0].function, "longWork");
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Aggregate snapshots across all registered threads
pub mod aggregate;

/// The one-shot snapshot capture protocol
pub mod capture;

/// Error taxonomy
pub mod error;

/// Stack frame sanitization
pub mod frame;

/// The process-wide thread registry
pub mod registry;

/// Host-callable surface over the global registry
pub mod service;

pub use aggregate::{capture_all, capture_all_deadline, AggregateSnapshot};
pub use capture::{capture, capture_deadline, CaptureResult, MAX_CAPTURE_FRAMES};
pub use error::{TraceError, TraceResult};
pub use frame::{StackFrame, ANONYMOUS_LABEL, CONSTRUCTOR_LABEL, EVAL_LABEL};
pub use registry::ThreadRegistry;
pub use service::{
    capture_stack_trace, capture_stack_trace_deadline, capture_stack_trace_json,
    register_current_thread, register_thread, thread_last_seen,
};
