//! Script call stack bookkeeping
//!
//! Each engine context owns one `ScriptStack`. The owning thread pushes a
//! `FrameInfo` when script execution enters a function and pops it on the way
//! out; any thread may take a bounded, innermost-first walk of the live stack
//! (used by interrupt callbacks, which run on the owning thread anyway).

use parking_lot::Mutex;

/// Raw descriptor of one live call frame, as reported by the engine's walker.
///
/// This is deliberately unnormalized: the function name may be absent (anonymous
/// functions, top-level script), the script name may be absent (native frames),
/// and the eval/constructor flags are reported as-is. Display normalization is
/// the consumer's concern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameInfo {
    /// Candidate function name, if the engine knows one
    pub function_name: Option<String>,

    /// Frame is an eval context
    pub is_eval: bool,

    /// Frame is a constructor invocation
    pub is_constructor: bool,

    /// Script (source file) name, if any
    pub script_name: Option<String>,

    /// 1-based line number within the script
    pub line: u32,

    /// 1-based column number within the line
    pub column: u32,
}

impl FrameInfo {
    /// Convenience constructor for an ordinary named call frame.
    pub fn call(
        function_name: impl Into<String>,
        script_name: impl Into<String>,
        line: u32,
        column: u32,
    ) -> Self {
        Self {
            function_name: Some(function_name.into()),
            script_name: Some(script_name.into()),
            line,
            column,
            ..Self::default()
        }
    }
}

/// The live call stack of one engine context.
///
/// Frames are stored in call order (outermost first). Only the owning thread
/// pushes and pops; the mutex exists so interrupt callbacks and diagnostics can
/// read a consistent view without racing a push in progress.
pub struct ScriptStack {
    frames: Mutex<Vec<FrameInfo>>,
}

impl ScriptStack {
    /// Create an empty stack.
    pub fn new() -> Self {
        Self {
            frames: Mutex::new(Vec::new()),
        }
    }

    /// Push a frame on function entry.
    pub fn push(&self, frame: FrameInfo) {
        self.frames.lock().push(frame);
    }

    /// Pop the innermost frame on function exit.
    pub fn pop(&self) -> Option<FrameInfo> {
        self.frames.lock().pop()
    }

    /// Current stack depth.
    pub fn depth(&self) -> usize {
        self.frames.lock().len()
    }

    /// Walk up to `max_frames` frames, innermost first.
    ///
    /// Returns an empty vector when there is no capturable stack.
    pub fn trace(&self, max_frames: usize) -> Vec<FrameInfo> {
        let frames = self.frames.lock();
        frames.iter().rev().take(max_frames).cloned().collect()
    }
}

impl Default for ScriptStack {
    fn default() -> Self {
        Self::new()
    }
}
