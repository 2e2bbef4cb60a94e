//! Pod log retrieval tool.
//!
//! Returns the trailing lines of a pod's log stream. The fixture backing
//! synthesizes a deterministic log buffer per pod: healthy pods produce
//! request traffic, crash-looping pods produce connection errors, so the
//! model sees realistic observations in both directions.

use async_trait::async_trait;
use serde_json::json;
use steward_core::error::ToolError;
use steward_core::{JsonMap, Tool};
use tracing::debug;

use crate::fixtures;
use crate::to_object;

/// Size of the synthesized log buffer per pod.
const LOG_BUFFER_LINES: u64 = 100;
/// Hard cap on the number of returned lines.
const MAX_TAIL_LINES: u64 = 200;
const DEFAULT_TAIL_LINES: u64 = 20;

pub struct PodLogsTool;

#[async_trait]
impl Tool for PodLogsTool {
    fn name(&self) -> &str {
        "get_pod_logs"
    }

    fn description(&self) -> &str {
        "Fetch the most recent log lines from a pod in a Kubernetes cluster."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "cluster_id": {
                    "type": "string",
                    "description": "The ID of the cluster. Common values: 'prod', 'dev', 'staging'."
                },
                "pod_name": {
                    "type": "string",
                    "description": "The name of the pod to read logs from."
                },
                "tail_lines": {
                    "type": "integer",
                    "description": "How many trailing lines to return (default 20, max 200)."
                }
            },
            "required": ["cluster_id", "pod_name"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<JsonMap, ToolError> {
        let cluster_id = arguments["cluster_id"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'cluster_id' argument".into()))?;
        let pod_name = arguments["pod_name"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'pod_name' argument".into()))?;
        let tail_lines = arguments["tail_lines"]
            .as_u64()
            .unwrap_or(DEFAULT_TAIL_LINES)
            .min(MAX_TAIL_LINES);

        debug!(cluster_id, pod_name, tail_lines, "fetching pod logs");

        let cluster = fixtures::cluster(cluster_id).ok_or_else(|| ToolError::ExecutionFailed {
            tool_name: "get_pod_logs".into(),
            reason: format!("unknown cluster '{cluster_id}'"),
        })?;
        let pod = cluster
            .pods
            .iter()
            .find(|p| p.name == pod_name)
            .ok_or_else(|| ToolError::ExecutionFailed {
                tool_name: "get_pod_logs".into(),
                reason: format!("pod '{pod_name}' not found in cluster '{cluster_id}'"),
            })?;

        let lines = synthesize_log_tail(pod.name, pod.phase, tail_lines);

        Ok(to_object(json!({
            "cluster_id": cluster_id,
            "pod_name": pod_name,
            "phase": pod.phase,
            "tail_lines": lines.len(),
            "lines": lines,
        })))
    }
}

/// Deterministic log tail for a pod: seq numbers are stable, content
/// depends only on the pod name and phase.
fn synthesize_log_tail(pod_name: &str, phase: &str, tail_lines: u64) -> Vec<String> {
    // Simple hash for deterministic but per-pod varied latencies.
    let hash: u64 = pod_name
        .bytes()
        .fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));

    let failing = phase != "Running";
    let start = LOG_BUFFER_LINES.saturating_sub(tail_lines);

    (start..LOG_BUFFER_LINES)
        .map(|seq| {
            if failing && seq % 3 != 0 {
                format!(
                    "ERROR [seq {seq}] connection refused: {pod_name}-backend:5432, retrying"
                )
            } else if failing {
                format!("WARN  [seq {seq}] container restarting, backoff {}s", (seq % 5) * 10)
            } else {
                format!(
                    "INFO  [seq {seq}] request handled in {}ms",
                    5 + (hash.wrapping_add(seq)) % 40
                )
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_requested_tail() {
        let tool = PodLogsTool;
        let result = tool
            .execute(json!({"cluster_id": "prod", "pod_name": "api-service", "tail_lines": 5}))
            .await
            .unwrap();

        assert_eq!(result["tail_lines"], 5);
        let lines = result["lines"].as_array().unwrap();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].as_str().unwrap().starts_with("INFO"));
    }

    #[tokio::test]
    async fn failing_pod_logs_show_errors() {
        let tool = PodLogsTool;
        let result = tool
            .execute(json!({"cluster_id": "prod", "pod_name": "payment-service", "tail_lines": 10}))
            .await
            .unwrap();

        let lines = result["lines"].as_array().unwrap();
        assert!(
            lines
                .iter()
                .any(|l| l.as_str().unwrap().starts_with("ERROR"))
        );
        assert_eq!(result["phase"], "CrashLoopBackOff");
    }

    #[tokio::test]
    async fn deterministic_output() {
        let tool = PodLogsTool;
        let args = json!({"cluster_id": "prod", "pod_name": "worker", "tail_lines": 8});
        let a = tool.execute(args.clone()).await.unwrap();
        let b = tool.execute(args).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn tail_is_capped() {
        let tool = PodLogsTool;
        let result = tool
            .execute(json!({"cluster_id": "prod", "pod_name": "api-service", "tail_lines": 10_000}))
            .await
            .unwrap();
        // Capped to the buffer size, never 10k lines.
        assert!(result["lines"].as_array().unwrap().len() <= LOG_BUFFER_LINES as usize);
    }

    #[tokio::test]
    async fn unknown_pod_fails() {
        let tool = PodLogsTool;
        let err = tool
            .execute(json!({"cluster_id": "prod", "pod_name": "ghost"}))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("ghost"));
    }

    #[tokio::test]
    async fn missing_arguments_fail() {
        let tool = PodLogsTool;
        assert!(tool.execute(json!({"cluster_id": "prod"})).await.is_err());
        assert!(tool.execute(json!({"pod_name": "api-service"})).await.is_err());
    }
}
