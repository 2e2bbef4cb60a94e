//! Drift classification: non-fatal reasoning anomalies.
//!
//! Drift is any detected deviation from expected reasoning behavior:
//! malformed output the repair pass could not recover, a reference to a
//! tool that does not exist, or the same action repeated identically.
//! Drift events are fire-and-forget notifications to an external sink;
//! they never alter the loop outcome.

use serde::{Deserialize, Serialize};

/// The kinds of reasoning failure the loop can classify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftKind {
    /// The parser could not recover valid call arguments even after repair.
    InvalidJson,
    /// A parsed tool name is absent from the registered schema list.
    UnknownTool,
    /// An identical tool-call signature recurred within one session.
    InfiniteLoop,
}

impl DriftKind {
    /// The wire/label name of this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            DriftKind::InvalidJson => "invalid_json",
            DriftKind::UnknownTool => "unknown_tool",
            DriftKind::InfiniteLoop => "infinite_loop",
        }
    }
}

impl std::fmt::Display for DriftKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sink for reasoning-failure notifications.
///
/// Implementations must never block or panic into the loop: recording a
/// failure is advisory and the loop continues regardless.
pub trait FailureSink: Send + Sync {
    /// Record one reasoning failure with structured details
    /// (step number, tool name, raw fragment, and similar context).
    fn record_reasoning_failure(&self, kind: DriftKind, details: serde_json::Value);
}

/// A sink that discards everything. Default for tests and for callers
/// that do not care about drift.
pub struct NullSink;

impl FailureSink for NullSink {
    fn record_reasoning_failure(&self, _kind: DriftKind, _details: serde_json::Value) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_labels() {
        assert_eq!(DriftKind::InvalidJson.as_str(), "invalid_json");
        assert_eq!(DriftKind::UnknownTool.as_str(), "unknown_tool");
        assert_eq!(DriftKind::InfiniteLoop.as_str(), "infinite_loop");
    }

    #[test]
    fn kind_serializes_snake_case() {
        let json = serde_json::to_string(&DriftKind::InfiniteLoop).unwrap();
        assert_eq!(json, r#""infinite_loop""#);
    }

    #[test]
    fn null_sink_accepts_everything() {
        let sink = NullSink;
        sink.record_reasoning_failure(DriftKind::UnknownTool, serde_json::json!({"tool": "x"}));
    }
}
