//! Worker threads that own an engine context
//!
//! `EngineWorker` pairs one named OS thread with one `EngineContext` and a
//! shutdown flag. The thread runs a caller-supplied script body; cooperative
//! bodies keep calling `poll` so interrupts get serviced. This is a harness
//! for demos and integration tests, not something the capture subsystem
//! itself requires.

use crate::context::EngineContext;
use crate::stack::FrameInfo;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Sleep between polls in the built-in idle loop, to avoid busy-waiting.
const IDLE_POLL_INTERVAL: Duration = Duration::from_micros(100);

/// A worker thread owning exactly one engine context.
pub struct EngineWorker {
    /// The context owned by this worker's thread
    context: Arc<EngineContext>,

    /// Shutdown signal
    shutdown: Arc<AtomicBool>,

    /// Worker thread handle
    handle: Option<thread::JoinHandle<()>>,
}

impl EngineWorker {
    /// Spawn a named worker running `body` with its own context.
    ///
    /// The body receives the context and the shutdown flag; it is responsible
    /// for polling safepoints and for honoring the flag.
    pub fn spawn<F>(name: &str, body: F) -> Self
    where
        F: FnOnce(&Arc<EngineContext>, &AtomicBool) + Send + 'static,
    {
        let context = Arc::new(EngineContext::new());
        let shutdown = Arc::new(AtomicBool::new(false));

        let thread_context = context.clone();
        let thread_shutdown = shutdown.clone();
        let handle = thread::Builder::new()
            .name(format!("periscope-{}", name))
            .spawn(move || {
                body(&thread_context, &thread_shutdown);
            })
            .expect("Failed to spawn worker thread");

        Self {
            context,
            shutdown,
            handle: Some(handle),
        }
    }

    /// Spawn a worker that just polls safepoints until stopped.
    pub fn spawn_idle(name: &str) -> Self {
        Self::spawn_script(name, Vec::new())
    }

    /// Spawn a worker that enters the given frames (outermost first) and then
    /// polls safepoints until stopped, as if busy inside the innermost call.
    pub fn spawn_script(name: &str, frames: Vec<FrameInfo>) -> Self {
        Self::spawn(name, move |context, shutdown| {
            for frame in frames {
                context.push_frame(frame);
            }
            while !shutdown.load(Ordering::Acquire) {
                context.poll();
                thread::sleep(IDLE_POLL_INTERVAL);
            }
        })
    }

    /// The context owned by this worker's thread.
    pub fn context(&self) -> &Arc<EngineContext> {
        &self.context
    }

    /// Signal shutdown and join the worker thread.
    pub fn stop(&mut self) {
        self.shutdown.store(true, Ordering::Release);

        if let Some(handle) = self.handle.take() {
            handle.join().expect("Failed to join worker thread");
        }
    }
}

impl Drop for EngineWorker {
    fn drop(&mut self) {
        self.stop();
    }
}
