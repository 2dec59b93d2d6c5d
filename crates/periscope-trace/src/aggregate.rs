//! Aggregate snapshots
//!
//! Fans the capture protocol out across every registered thread except the
//! caller, one concurrent capture task per target, and joins the results
//! into one name-keyed snapshot. Captures run in parallel because each one
//! blocks until its own target reaches a safepoint; total latency is bounded
//! by the slowest single target rather than the sum of all targets.
//!
//! While joining, the calling thread keeps polling its *own* context, so two
//! threads may aggregate each other concurrently without deadlocking on each
//! other's safepoints.

use crate::capture::{capture, capture_deadline, CaptureResult};
use crate::registry::ThreadRegistry;
use crossbeam::channel::{self, RecvTimeoutError};
use periscope_engine::EngineContext;
use std::collections::HashMap;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// How often the joining thread services its own safepoint while waiting.
const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// One capture result per thread display name.
///
/// Names are expected but not guaranteed unique; on a collision the later
/// insertion wins. Not retained by the subsystem after it is handed out.
pub type AggregateSnapshot = HashMap<String, CaptureResult>;

/// Capture every registered thread except the caller, with no per-target
/// timeout. Blocks until every launched capture settles; a single target
/// that never reaches a safepoint therefore blocks the whole aggregate.
pub fn capture_all(registry: &Arc<ThreadRegistry>, caller: &Arc<EngineContext>) -> AggregateSnapshot {
    fan_out(registry, caller, None)
}

/// Bounded variant of [`capture_all`]: targets that do not settle within
/// `deadline` are omitted from the aggregate instead of blocking it.
pub fn capture_all_deadline(
    registry: &Arc<ThreadRegistry>,
    caller: &Arc<EngineContext>,
    deadline: Duration,
) -> AggregateSnapshot {
    fan_out(registry, caller, Some(deadline))
}

fn fan_out(
    registry: &Arc<ThreadRegistry>,
    caller: &Arc<EngineContext>,
    deadline: Option<Duration>,
) -> AggregateSnapshot {
    // The target set is fixed here; threads registering later are not
    // included. Entries whose engine is already gone have nothing left to
    // interrupt and are skipped outright.
    let targets: Vec<(Arc<EngineContext>, String)> = registry
        .snapshot_except(caller.id())
        .into_iter()
        .filter_map(|(weak, name)| weak.upgrade().map(|engine| (engine, name)))
        .collect();

    let expected = targets.len();
    tracing::debug!(caller = ?caller.id(), targets = expected, "aggregate capture started");

    let mut snapshot = AggregateSnapshot::with_capacity(expected);
    let (results, joined) = channel::unbounded();

    thread::scope(|scope| {
        for (engine, name) in targets {
            let results = results.clone();
            scope.spawn(move || {
                let outcome = match deadline {
                    Some(limit) => capture_deadline(&engine, limit),
                    None => Ok(capture(&engine)),
                };
                let _ = results.send((name, outcome));
            });
        }
        drop(results);

        let mut settled = 0;
        while settled < expected {
            match joined.recv_timeout(JOIN_POLL_INTERVAL) {
                Ok((name, Ok(frames))) => {
                    snapshot.insert(name, frames);
                    settled += 1;
                }
                Ok((name, Err(err))) => {
                    tracing::debug!(%name, %err, "target omitted from aggregate");
                    settled += 1;
                }
                // Keep servicing our own safepoint so a concurrent aggregate
                // targeting this thread can settle too.
                Err(RecvTimeoutError::Timeout) => caller.poll(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    });

    tracing::debug!(caller = ?caller.id(), captured = snapshot.len(), "aggregate capture finished");
    snapshot
}

#[cfg(test)]
mod tests {
    use super::*;
    use periscope_engine::{EngineWorker, FrameInfo};

    #[test]
    fn test_empty_registry_yields_empty_snapshot() {
        let registry = Arc::new(ThreadRegistry::new());
        let caller = Arc::new(EngineContext::new());
        assert!(capture_all(&registry, &caller).is_empty());
    }

    #[test]
    fn test_caller_is_never_included() {
        let registry = Arc::new(ThreadRegistry::new());
        let caller = Arc::new(EngineContext::new());
        registry.register(&caller, "main");

        let worker = EngineWorker::spawn_idle("w1");
        registry.register(worker.context(), "worker-1");

        let snapshot = capture_all(&registry, &caller);
        assert!(!snapshot.contains_key("main"));
        assert!(snapshot.contains_key("worker-1"));
    }

    #[test]
    fn test_idle_target_yields_empty_entry_not_omission() {
        let registry = Arc::new(ThreadRegistry::new());
        let caller = Arc::new(EngineContext::new());

        let worker = EngineWorker::spawn_idle("idle");
        registry.register(worker.context(), "idle");

        let snapshot = capture_all(&registry, &caller);
        assert_eq!(snapshot.get("idle"), Some(&Vec::new()));
    }

    #[test]
    fn test_torn_down_target_is_skipped() {
        let registry = Arc::new(ThreadRegistry::new());
        let caller = Arc::new(EngineContext::new());

        let doomed = Arc::new(EngineContext::new());
        registry.register(&doomed, "doomed");
        // Snapshot the handle list before the engine goes away to show the
        // registry hands out weak handles that stop upgrading at teardown
        let targets = registry.snapshot_except(caller.id());
        drop(doomed);
        assert!(targets[0].0.upgrade().is_none());

        let snapshot = capture_all(&registry, &caller);
        assert!(snapshot.is_empty());
    }

    #[test]
    fn test_deadline_variant_omits_wedged_targets_only() {
        let registry = Arc::new(ThreadRegistry::new());
        let caller = Arc::new(EngineContext::new());

        let responsive =
            EngineWorker::spawn_script("ok", vec![FrameInfo::call("work", "w.js", 3, 1)]);
        registry.register(responsive.context(), "responsive");

        let wedged = EngineWorker::spawn("wedged", |_ctx, shutdown| {
            while !shutdown.load(std::sync::atomic::Ordering::Acquire) {
                std::thread::sleep(Duration::from_millis(1));
            }
        });
        registry.register(wedged.context(), "wedged");

        let snapshot = capture_all_deadline(&registry, &caller, Duration::from_millis(100));
        assert!(snapshot.contains_key("responsive"));
        assert!(!snapshot.contains_key("wedged"));
    }

    #[test]
    fn test_name_collision_keeps_one_entry() {
        let registry = Arc::new(ThreadRegistry::new());
        let caller = Arc::new(EngineContext::new());

        let a = EngineWorker::spawn_idle("a");
        let b = EngineWorker::spawn_idle("b");
        registry.register(a.context(), "twin");
        registry.register(b.context(), "twin");

        let snapshot = capture_all(&registry, &caller);
        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.contains_key("twin"));
    }
}
