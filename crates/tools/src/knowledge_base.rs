//! Knowledge-base search tool.
//!
//! Searches runbook and architecture snippets by keyword overlap. In
//! production this front-ends a vector store; the retrieval mechanics
//! are out of scope here, so a seeded document set with a word-overlap
//! score keeps the result shape (content, source, score) identical.

use async_trait::async_trait;
use serde_json::json;
use std::collections::HashSet;
use steward_core::error::ToolError;
use steward_core::{JsonMap, Tool};
use tracing::debug;

use crate::to_object;

const DEFAULT_TOP_K: u64 = 3;
const MAX_TOP_K: u64 = 10;

struct Document {
    source: &'static str,
    content: &'static str,
}

const DOCUMENTS: &[Document] = &[
    Document {
        source: "runbook-restarts.md",
        content: "Restart policy for critical services: always use rolling restarts with \
                  maxUnavailable=0. Critical services (payment-service, api-service) must \
                  keep 99.9% uptime and require an incident ticket before manual restarts.",
    },
    Document {
        source: "runbook-crashloop.md",
        content: "When a pod is in CrashLoopBackOff, fetch the trailing logs first. The most \
                  common causes are a failed database connection, a bad config map rollout, \
                  or an OOM kill. Check restart counts before deleting the pod.",
    },
    Document {
        source: "architecture-payments.md",
        content: "The payment-service depends on the payments-db instance and the ledger \
                  queue. A connection refused error against payments-db usually means the \
                  db failover has not completed.",
    },
    Document {
        source: "runbook-nodes.md",
        content: "A NotReady node should be cordoned and drained before investigation. \
                  Node readiness flaps in the dev cluster are expected during nightly \
                  image rebuilds.",
    },
    Document {
        source: "oncall-escalation.md",
        content: "Escalate to the on-call platform engineer when more than one node is \
                  NotReady in prod, or when payment-service downtime exceeds five minutes.",
    },
];

pub struct KnowledgeBaseTool;

#[async_trait]
impl Tool for KnowledgeBaseTool {
    fn name(&self) -> &str {
        "search_knowledge_base"
    }

    fn description(&self) -> &str {
        "Search the internal knowledge base for information about Kubernetes, runbooks, and procedures."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to look up in the knowledge base."
                },
                "top_k": {
                    "type": "integer",
                    "description": "Number of results to retrieve (default 3, max 10)."
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, arguments: serde_json::Value) -> Result<JsonMap, ToolError> {
        let query = arguments["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;
        let top_k = arguments["top_k"].as_u64().unwrap_or(DEFAULT_TOP_K).min(MAX_TOP_K) as usize;

        debug!(query, top_k, "searching knowledge base");

        let results = search(query, top_k);
        let matches: Vec<serde_json::Value> = results
            .iter()
            .map(|(doc, score)| {
                json!({
                    "source": doc.source,
                    "content": doc.content,
                    "score": (score * 100.0).round() / 100.0,
                })
            })
            .collect();

        Ok(to_object(json!({
            "query": query,
            "total_matches": matches.len(),
            "results": matches,
        })))
    }
}

/// Word-overlap retrieval: the score is the fraction of query terms
/// (3+ characters) found in the document, descending, top-k, zero-score
/// documents dropped.
fn search(query: &str, top_k: usize) -> Vec<(&'static Document, f64)> {
    let terms: HashSet<String> = query
        .to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| w.len() >= 3)
        .map(String::from)
        .collect();
    if terms.is_empty() {
        return Vec::new();
    }

    let mut scored: Vec<(&Document, f64)> = DOCUMENTS
        .iter()
        .map(|doc| {
            let content = doc.content.to_lowercase();
            let hits = terms.iter().filter(|t| content.contains(t.as_str())).count();
            (doc, hits as f64 / terms.len() as f64)
        })
        .filter(|(_, score)| *score > 0.0)
        .collect();

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(top_k);
    scored
}
