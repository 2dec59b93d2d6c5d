//! Periscope Engine
//!
//! A minimal cooperative execution engine, one instance per worker thread:
//! - **Contexts**: `EngineContext`, an independent execution context with its
//!   own live script stack (`context` module)
//! - **Interrupts**: cross-thread interrupt requests serviced at safepoint
//!   polls on the owning thread (`interrupt` module)
//! - **Stack**: raw frame descriptors and the bounded innermost-first walk
//!   (`stack` module)
//! - **Workers**: a named-thread harness pairing one OS thread with one
//!   context (`worker` module)
//!
//! This crate is the host seam consumed by `periscope-trace`: it stands in
//! for the embedding API a managed runtime exposes for "interrupt this
//! instance at its next safe point and run a callback there".

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

/// Engine contexts and identities
pub mod context;

/// Interrupt requests and safepoint polling
pub mod interrupt;

/// Script call stack bookkeeping
pub mod stack;

/// Worker thread harness
pub mod worker;

pub use context::{EngineContext, EngineId, TeardownHook};
pub use interrupt::InterruptCallback;
pub use stack::{FrameInfo, ScriptStack};
pub use worker::EngineWorker;
