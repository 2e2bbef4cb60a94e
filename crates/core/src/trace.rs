//! Reasoning-trace domain types.
//!
//! A session produces an append-only trace of reasoning steps and tool
//! call records; both are carried in the final [`AgentResult`] and are
//! the raw material for training-data collection. Entries are never
//! mutated or reordered once appended.

use crate::tool::JsonMap;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The kind of a reasoning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Think,
    Act,
    Observe,
    FinalAnswer,
}

/// A single step in the reasoning trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReasoningStep {
    /// 1-based step number within the session.
    pub step: usize,

    /// What kind of step this is.
    #[serde(rename = "type")]
    pub kind: StepKind,

    /// The step content: a thought, an action summary, an observation,
    /// or the final answer text.
    pub content: String,

    /// Snapshot of the accumulated context when the step was recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,

    /// When the step was recorded.
    pub timestamp: DateTime<Utc>,
}

impl ReasoningStep {
    pub fn new(step: usize, kind: StepKind, content: impl Into<String>) -> Self {
        Self {
            step,
            kind,
            content: content.into(),
            context: None,
            timestamp: Utc::now(),
        }
    }

    /// Attach a context snapshot to this step.
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

/// Whether a tool call succeeded or failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Success,
    Failed,
}

/// A record of one tool execution within a session.
///
/// Exactly one of `result` / `error` is present; the constructors are
/// the only way these are built, which keeps the invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCallRecord {
    /// Name of the executed tool.
    pub tool: String,

    /// The arguments the tool was invoked with.
    pub arguments: JsonMap,

    /// The tool's result mapping (success only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<JsonMap>,

    /// The failure message (failure only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Success or failure.
    pub status: CallStatus,
}

impl ToolCallRecord {
    /// Record a successful execution.
    pub fn succeeded(tool: impl Into<String>, arguments: JsonMap, result: JsonMap) -> Self {
        Self {
            tool: tool.into(),
            arguments,
            result: Some(result),
            error: None,
            status: CallStatus::Success,
        }
    }

    /// Record a failed execution.
    pub fn failed(tool: impl Into<String>, arguments: JsonMap, error: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            arguments,
            result: None,
            error: Some(error.into()),
            status: CallStatus::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == CallStatus::Success
    }
}

/// The final outcome of one `process_request` session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentResult {
    /// The response text (final answer or fallback hedge).
    pub response: String,

    /// All tool calls made, in execution order.
    pub tool_calls: Vec<ToolCallRecord>,

    /// The full reasoning trace, in order.
    pub reasoning: Vec<ReasoningStep>,

    /// Number of Think iterations actually executed (1-based).
    pub steps_taken: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_kind_serializes_snake_case() {
        let step = ReasoningStep::new(1, StepKind::FinalAnswer, "done");
        let json = serde_json::to_string(&step).unwrap();
        assert!(json.contains(r#""type":"final_answer""#));
    }

    #[test]
    fn success_record_has_result_only() {
        let mut result = JsonMap::new();
        result.insert("status".into(), serde_json::json!("HEALTHY"));
        let record = ToolCallRecord::succeeded("get_cluster_status", JsonMap::new(), result);

        assert!(record.is_success());
        assert!(record.result.is_some());
        assert!(record.error.is_none());

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains(r#""status":"success""#));
        assert!(!json.contains("error"));
    }

    #[test]
    fn failed_record_has_error_only() {
        let record =
            ToolCallRecord::failed("get_pod_logs", JsonMap::new(), "unknown pod 'api-service'");

        assert!(!record.is_success());
        assert!(record.result.is_none());
        assert_eq!(record.error.as_deref(), Some("unknown pod 'api-service'"));
    }

    #[test]
    fn step_context_snapshot_is_optional() {
        let bare = ReasoningStep::new(1, StepKind::Observe, "obs");
        assert!(bare.context.is_none());

        let with = ReasoningStep::new(2, StepKind::Think, "thinking").with_context("query so far");
        assert_eq!(with.context.as_deref(), Some("query so far"));
    }
}
