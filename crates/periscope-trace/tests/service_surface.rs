//! Integration tests for the host-callable surface
//!
//! These exercise the process-wide registry, so each test takes the SERIAL
//! lock and cleans up its workers before releasing it.

use parking_lot::Mutex;
use periscope_engine::{EngineContext, EngineWorker, FrameInfo};
use periscope_trace::{
    capture_stack_trace, capture_stack_trace_json, register_thread, thread_last_seen,
};
use std::sync::Arc;

static SERIAL: Mutex<()> = Mutex::new(());

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn worker_frames() -> Vec<FrameInfo> {
    vec![
        FrameInfo {
            function_name: None,
            script_name: Some("worker.js".to_owned()),
            line: 14,
            column: 1,
            ..FrameInfo::default()
        },
        FrameInfo::call("longWork", "worker.js", 10, 29),
    ]
}

#[test]
fn test_capture_stack_trace_scenario() {
    let _serial = SERIAL.lock();
    init_tracing();

    let main = Arc::new(EngineContext::new());
    register_thread(&main, "main").unwrap();

    let worker = EngineWorker::spawn_script("worker-1", worker_frames());
    register_thread(worker.context(), "worker-1").unwrap();

    let snapshot = capture_stack_trace(&main);
    assert_eq!(snapshot.len(), 1);

    let frames = &snapshot["worker-1"];
    assert_eq!(frames[0].function, "longWork");
    assert_eq!(frames[0].filename, "worker.js");
    assert_eq!(frames[0].lineno, 10);
    assert_eq!(frames[0].colno, 29);
    assert_eq!(frames[1].function, "?");

    // Wire form: {"worker-1": [{function, filename, lineno, colno}, ...]}
    let json: serde_json::Value =
        serde_json::from_str(&capture_stack_trace_json(&main).unwrap()).unwrap();
    let frame = &json["worker-1"][0];
    assert_eq!(frame["function"], "longWork");
    assert_eq!(frame["filename"], "worker.js");
    assert_eq!(frame["lineno"], 10);
    assert_eq!(frame["colno"], 29);
}

#[test]
fn test_last_seen_requires_a_second_registration() {
    let _serial = SERIAL.lock();
    init_tracing();

    let worker = EngineWorker::spawn_idle("hb");
    register_thread(worker.context(), "heartbeater").unwrap();
    assert!(!thread_last_seen().contains_key("heartbeater"));

    register_thread(worker.context(), "heartbeater").unwrap();
    let report = thread_last_seen();
    // Present with a non-negative millisecond staleness
    assert!(report.contains_key("heartbeater"));
}

#[test]
fn test_teardown_removes_thread_from_surface() {
    let _serial = SERIAL.lock();
    init_tracing();

    let main = Arc::new(EngineContext::new());
    register_thread(&main, "surface-main").unwrap();

    {
        let transient = EngineWorker::spawn_idle("transient");
        register_thread(transient.context(), "surface-transient").unwrap();
        register_thread(transient.context(), "surface-transient").unwrap();

        assert!(capture_stack_trace(&main).contains_key("surface-transient"));
        assert!(thread_last_seen().contains_key("surface-transient"));
    }

    assert!(!capture_stack_trace(&main).contains_key("surface-transient"));
    assert!(!thread_last_seen().contains_key("surface-transient"));
}

#[test]
fn test_unregistered_caller_still_captures_others() {
    let _serial = SERIAL.lock();
    init_tracing();

    // Capturing before any registerThread call: no entry for the caller,
    // but registered threads still show up.
    let caller = Arc::new(EngineContext::new());
    let worker = EngineWorker::spawn_idle("bystander");
    register_thread(worker.context(), "bystander").unwrap();

    let snapshot = capture_stack_trace(&caller);
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot["bystander"], Vec::new());
}
