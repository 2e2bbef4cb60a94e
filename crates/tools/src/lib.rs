//! Built-in tool implementations for Steward.
//!
//! Tools give the agent the ability to act on the clusters it manages:
//! check node and pod health, pull logs, and search the runbook
//! knowledge base.
//!
//! The real cluster client and the vector store are external
//! collaborators; these implementations are fixture-backed and
//! deterministic so the reasoning loop can be exercised end-to-end
//! without network access. Every tool is reentrant: execution reads
//! only fixed configuration, so concurrent sessions can share one
//! registry.

pub mod cluster_status;
pub mod knowledge_base;
pub mod pod_logs;
pub mod pod_status;

mod fixtures;

use steward_core::{JsonMap, ToolRegistry};

/// Create a default tool registry with all built-in tools.
pub fn default_registry() -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(Box::new(cluster_status::ClusterStatusTool));
    registry.register(Box::new(pod_status::PodStatusTool));
    registry.register(Box::new(pod_logs::PodLogsTool));
    registry.register(Box::new(knowledge_base::KnowledgeBaseTool));
    registry
}

/// Convert a `json!` object literal into the result mapping shape.
pub(crate) fn to_object(value: serde_json::Value) -> JsonMap {
    value.as_object().cloned().unwrap_or_default()
}
