//! Stack frame sanitization
//!
//! Normalizes one raw frame descriptor into a displayable record with a
//! guaranteed non-empty function label. Rule precedence, highest first:
//! eval context, then missing/empty name, then constructor invocation, then
//! the candidate name verbatim. Line and column pass through unchanged; a
//! missing script name yields an empty filename, never an error.

use periscope_engine::FrameInfo;
use serde::{Deserialize, Serialize};

/// Label for frames executing inside an eval context.
pub const EVAL_LABEL: &str = "[eval]";

/// Label for frames with no usable function name.
pub const ANONYMOUS_LABEL: &str = "?";

/// Label for constructor invocations.
pub const CONSTRUCTOR_LABEL: &str = "[constructor]";

/// One sanitized, displayable stack frame.
///
/// The serialized field names are the wire contract: callers receive frame
/// objects shaped `{function, filename, lineno, colno}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    /// Human-meaningful function label, never empty
    pub function: String,

    /// Source file name; empty when the engine reported none
    pub filename: String,

    /// Line number, as reported by the walker
    pub lineno: u32,

    /// Column number, as reported by the walker
    pub colno: u32,
}

impl StackFrame {
    /// Sanitize one raw frame. Total: every raw frame maps to a record.
    pub fn sanitize(raw: &FrameInfo) -> Self {
        let function = match raw.function_name.as_deref() {
            _ if raw.is_eval => EVAL_LABEL.to_owned(),
            None | Some("") => ANONYMOUS_LABEL.to_owned(),
            Some(_) if raw.is_constructor => CONSTRUCTOR_LABEL.to_owned(),
            Some(name) => name.to_owned(),
        };

        Self {
            function,
            filename: raw.script_name.clone().unwrap_or_default(),
            lineno: raw.line,
            colno: raw.column,
        }
    }
}
