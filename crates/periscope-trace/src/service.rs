//! Host-callable surface
//!
//! The three operations a host runtime exposes to script code, bound to the
//! process-wide registry: register/heartbeat the calling thread, capture an
//! aggregate snapshot of every other thread, and report per-thread staleness.

use crate::aggregate::{self, AggregateSnapshot};
use crate::error::{TraceError, TraceResult};
use crate::registry::ThreadRegistry;
use periscope_engine::EngineContext;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Register or heartbeat the calling thread's engine under `name`.
///
/// Rejects empty or all-whitespace names without mutating any state.
pub fn register_thread(engine: &Arc<EngineContext>, name: &str) -> TraceResult<()> {
    if name.trim().is_empty() {
        return Err(TraceError::InvalidThreadName);
    }
    ThreadRegistry::global().register(engine, name);
    Ok(())
}

/// Register or heartbeat the calling thread's engine under the thread's own
/// identity: the OS thread name when one is set, otherwise its thread id.
pub fn register_current_thread(engine: &Arc<EngineContext>) -> TraceResult<()> {
    let current = std::thread::current();
    let name = match current.name() {
        Some(name) => name.to_owned(),
        None => format!("{:?}", current.id()),
    };
    register_thread(engine, &name)
}

/// Capture the call stacks of every registered thread except the caller.
///
/// Blocks until every target settles; see [`capture_stack_trace_deadline`]
/// for the bounded variant.
pub fn capture_stack_trace(caller: &Arc<EngineContext>) -> AggregateSnapshot {
    aggregate::capture_all(ThreadRegistry::global(), caller)
}

/// Bounded variant of [`capture_stack_trace`]; unresponsive threads are
/// omitted once `deadline` elapses.
pub fn capture_stack_trace_deadline(
    caller: &Arc<EngineContext>,
    deadline: Duration,
) -> AggregateSnapshot {
    aggregate::capture_all_deadline(ThreadRegistry::global(), caller, deadline)
}

/// Serialized form of [`capture_stack_trace`]: a JSON object mapping thread
/// name to an array of `{function, filename, lineno, colno}` records.
pub fn capture_stack_trace_json(caller: &Arc<EngineContext>) -> TraceResult<String> {
    let snapshot = capture_stack_trace(caller);
    Ok(serde_json::to_string(&snapshot)?)
}

/// Milliseconds since each registered thread's last heartbeat, keyed by
/// display name. Threads that have registered only once are omitted.
pub fn thread_last_seen() -> HashMap<String, u64> {
    ThreadRegistry::global().staleness(Instant::now())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_rejects_empty_and_blank_names() {
        let ctx = Arc::new(EngineContext::new());
        assert!(matches!(
            register_thread(&ctx, ""),
            Err(TraceError::InvalidThreadName)
        ));
        assert!(matches!(
            register_thread(&ctx, "   "),
            Err(TraceError::InvalidThreadName)
        ));
        // Nothing was inserted for this engine
        assert!(ThreadRegistry::global()
            .snapshot_except(periscope_engine::EngineId::new())
            .iter()
            .all(|(handle, _)| handle
                .upgrade()
                .map_or(true, |engine| engine.id() != ctx.id())));
    }

    #[test]
    fn test_register_current_thread_uses_thread_identity() {
        let ctx = Arc::new(EngineContext::new());
        register_current_thread(&ctx).unwrap();

        let current = std::thread::current();
        let expected = match current.name() {
            Some(name) => name.to_owned(),
            None => format!("{:?}", current.id()),
        };

        let names: Vec<String> = ThreadRegistry::global()
            .snapshot_except(periscope_engine::EngineId::new())
            .into_iter()
            .map(|(_, name)| name)
            .collect();
        assert!(names.contains(&expected));
    }
}
