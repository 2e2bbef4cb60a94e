//! Cluster status tool: node counts, readiness, and overall health.
//!
//! In production this would go through the Kubernetes API; the fixture
//! backing keeps the result shape identical (status, node totals,
//! optional per-node details with `verbose`).

use async_trait::async_trait;
use serde_json::json;
use steward_core::error::ToolError;
use steward_core::{JsonMap, Tool};
use tracing::debug;

use crate::fixtures;
use crate::to_object;

pub struct ClusterStatusTool;

#[async_trait]
impl Tool for ClusterStatusTool {
    fn name(&self) -> &str {
        "get_cluster_status"
    }

    fn description(&self) -> &str {
        "Get the status of a Kubernetes cluster and node load."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "cluster_id": {
                    "type": "string",
                    "description": "The ID of the cluster to check. Common values: 'prod', 'dev', 'staging'. If user says 'production', use 'prod'."
                },
                "verbose": {
                    "type": "boolean",
                    "description": "Set to true if user wants per-node details."
                }
            },
            "required": ["cluster_id"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<JsonMap, ToolError> {
        let cluster_id = arguments["cluster_id"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'cluster_id' argument".into()))?;
        let verbose = arguments["verbose"].as_bool().unwrap_or(false);

        debug!(cluster_id, verbose, "checking cluster status");

        let cluster = fixtures::cluster(cluster_id).ok_or_else(|| ToolError::ExecutionFailed {
            tool_name: "get_cluster_status".into(),
            reason: format!(
                "unknown cluster '{}', known clusters: {}",
                cluster_id,
                fixtures::known_cluster_ids().join(", ")
            ),
        })?;

        let total = cluster.nodes.len();
        let ready = cluster.nodes.iter().filter(|n| n.ready).count();
        let status = if ready == total && total > 0 {
            "HEALTHY"
        } else {
            "DEGRADED"
        };

        let mut result = to_object(json!({
            "cluster_id": cluster_id,
            "status": status,
            "nodes_total": total,
            "nodes_active": ready,
            "nodes_not_ready": total - ready,
        }));

        if verbose {
            let details: Vec<serde_json::Value> = cluster
                .nodes
                .iter()
                .map(|n| {
                    json!({
                        "name": n.name,
                        "ready": n.ready,
                        "cpu": n.cpu,
                        "memory": n.memory,
                    })
                })
                .collect();
            result.insert("details".into(), serde_json::Value::Array(details));
        }

        Ok(result)
    }
}
