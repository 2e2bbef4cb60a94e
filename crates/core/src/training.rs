//! Training-data sink: optional capture of completed sessions.
//!
//! After a session terminates, the loop can offer the full
//! (instruction, trace, tool calls, output) tuple to a collector for
//! later fine-tuning. Collection is purely advisory: a `false` return
//! means the example was rejected (for example by a quality gate), and
//! implementation failures are logged and swallowed, never surfaced to
//! the request.

use crate::trace::{ReasoningStep, ToolCallRecord};

/// Consumer of completed reasoning sessions.
pub trait TrainingSink: Send + Sync {
    /// Offer one completed session. Returns whether the example was
    /// accepted. Must not panic into the loop.
    fn collect(
        &self,
        instruction: &str,
        reasoning_trace: &[ReasoningStep],
        tool_calls: &[ToolCallRecord],
        output: &str,
        metadata: serde_json::Value,
    ) -> bool;
}
