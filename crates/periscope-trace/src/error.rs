//! Error taxonomy for the capture subsystem
//!
//! Deliberately narrow: an empty stack is a valid (empty) capture, a thread
//! missing from the registry is simply absent from the aggregate, and an
//! unreachable target blocks the unbounded capture path rather than erroring.

use std::time::Duration;

/// Capture subsystem errors
#[derive(Debug, thiserror::Error)]
pub enum TraceError {
    /// Thread name given to registration was empty or all whitespace
    #[error("Invalid thread name: must be a non-empty string")]
    InvalidThreadName,

    /// Bounded capture elapsed before the target reached a safepoint
    #[error("Capture deadline of {0:?} exceeded before the target reached a safepoint")]
    DeadlineExceeded(Duration),

    /// Aggregate snapshot could not be serialized
    #[error("Snapshot serialization failed: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Capture subsystem result
pub type TraceResult<T> = Result<T, TraceError>;
