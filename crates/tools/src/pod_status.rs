//! Pod status tool: phases and restart counts for a cluster's pods.

use async_trait::async_trait;
use serde_json::json;
use steward_core::error::ToolError;
use steward_core::{JsonMap, Tool};
use tracing::debug;

use crate::fixtures;
use crate::to_object;

pub struct PodStatusTool;

#[async_trait]
impl Tool for PodStatusTool {
    fn name(&self) -> &str {
        "get_pod_status"
    }

    fn description(&self) -> &str {
        "List the pods in a Kubernetes cluster with their phase and restart counts."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "cluster_id": {
                    "type": "string",
                    "description": "The ID of the cluster. Common values: 'prod', 'dev', 'staging'."
                },
                "namespace": {
                    "type": "string",
                    "description": "Namespace to filter by (default: all)."
                }
            },
            "required": ["cluster_id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<JsonMap, ToolError> {
        let cluster_id = arguments["cluster_id"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'cluster_id' argument".into()))?;

        debug!(cluster_id, "listing pod status");

        let cluster = fixtures::cluster(cluster_id).ok_or_else(|| ToolError::ExecutionFailed {
            tool_name: "get_pod_status".into(),
            reason: format!(
                "unknown cluster '{}', known clusters: {}",
                cluster_id,
                fixtures::known_cluster_ids().join(", ")
            ),
        })?;

        let pods: Vec<serde_json::Value> = cluster
            .pods
            .iter()
            .map(|p| {
                json!({
                    "name": p.name,
                    "phase": p.phase,
                    "restarts": p.restarts,
                })
            })
            .collect();
        let running = cluster.pods.iter().filter(|p| p.phase == "Running").count();

        Ok(to_object(json!({
            "cluster_id": cluster_id,
            "pods": pods,
            "pods_total": cluster.pods.len(),
            "pods_running": running,
        })))
    }
}
