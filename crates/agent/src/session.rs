//! Per-request session state.
//!
//! A [`LoopState`] is created at the start of `process_request` and
//! dropped at its end; nothing in it is shared across requests. The
//! signature history is how the loop notices it is going in circles:
//! every dispatched call appends its canonical signature, and a repeat
//! count over that history drives the `infinite_loop` drift signal.

use std::collections::BTreeMap;
use steward_core::JsonMap;

/// Session-scoped mutable state for one reasoning loop.
#[derive(Debug)]
pub struct LoopState {
    /// Completed Think→Act→Observe iterations (0-based cursor).
    pub step: usize,
    /// The accumulated context string fed back into continuation prompts.
    pub context: String,
    /// Canonical signatures of every dispatched tool call, in order.
    pub signatures: Vec<String>,
    /// Whether the loop reached an explicit final answer.
    pub completed: bool,
}

impl LoopState {
    /// Start a session with the user query as initial context.
    pub fn new(query: &str) -> Self {
        Self {
            step: 0,
            context: query.to_string(),
            signatures: Vec::new(),
            completed: false,
        }
    }

    /// Append a call signature and return how many times it has now
    /// occurred in this session (including this occurrence).
    pub fn record_signature(&mut self, signature: String) -> usize {
        self.signatures.push(signature);
        let latest = self.signatures.last().expect("just pushed");
        self.signatures.iter().filter(|s| *s == latest).count()
    }

    /// Fold a thought and its observation into the running context.
    ///
    /// Context grows with every iteration; `max_steps` is the only bound
    /// on that growth, so callers with tight memory budgets should keep
    /// the step budget small.
    pub fn update_context(&mut self, thought: &str, observation: &str) {
        self.context = format!(
            "{}\n\nThought: {}\nObservation: {}\n\nWhat should I do next to answer the original question?",
            self.context, thought, observation
        );
    }

    /// Advance to the next iteration.
    pub fn advance(&mut self) {
        self.step += 1;
    }
}

/// The canonical signature of a tool call: `name + ":" + arguments`
/// serialized with keys sorted, so argument order in the raw text does
/// not matter. Nested objects serialize key-sorted as well.
pub fn call_signature(name: &str, arguments: &JsonMap) -> String {
    let canonical: BTreeMap<&String, &serde_json::Value> = arguments.iter().collect();
    format!(
        "{}:{}",
        name,
        serde_json::to_string(&canonical).unwrap_or_default()
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn args(pairs: &[(&str, serde_json::Value)]) -> JsonMap {
        let mut map = JsonMap::new();
        for (k, v) in pairs {
            map.insert((*k).to_string(), v.clone());
        }
        map
    }

    #[test]
    fn signature_is_order_insensitive() {
        let a = args(&[
            ("cluster_id", serde_json::json!("prod")),
            ("verbose", serde_json::json!(true)),
        ]);
        let b = args(&[
            ("verbose", serde_json::json!(true)),
            ("cluster_id", serde_json::json!("prod")),
        ]);
        assert_eq!(
            call_signature("get_cluster_status", &a),
            call_signature("get_cluster_status", &b)
        );
    }

    #[test]
    fn signature_distinguishes_arguments() {
        let prod = args(&[("cluster_id", serde_json::json!("prod"))]);
        let dev = args(&[("cluster_id", serde_json::json!("dev"))]);
        assert_ne!(
            call_signature("get_cluster_status", &prod),
            call_signature("get_cluster_status", &dev)
        );
    }

    #[test]
    fn signature_format() {
        let sig = call_signature("get_status", &args(&[("id", serde_json::json!("prod"))]));
        assert_eq!(sig, r#"get_status:{"id":"prod"}"#);
    }

    #[test]
    fn record_signature_counts_occurrences() {
        let mut state = LoopState::new("q");
        assert_eq!(state.record_signature("a:{}".into()), 1);
        assert_eq!(state.record_signature("b:{}".into()), 1);
        assert_eq!(state.record_signature("a:{}".into()), 2);
        assert_eq!(state.record_signature("a:{}".into()), 3);
        assert_eq!(state.signatures.len(), 4);
    }

    #[test]
    fn context_accumulates() {
        let mut state = LoopState::new("Check prod");
        state.update_context("I should check the cluster", "Tool returned HEALTHY");

        assert!(state.context.starts_with("Check prod"));
        assert!(state.context.contains("Thought: I should check the cluster"));
        assert!(state.context.contains("Observation: Tool returned HEALTHY"));
    }
}
