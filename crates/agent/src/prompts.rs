//! Prompt construction for small function-calling models.
//!
//! A 270M-class model needs a lot of hand-holding: an explicit role, a
//! strict call-format reminder, and few-shot exemplars chosen to match
//! the query. The manager keeps a fixed exemplar set, scores each one
//! against the query with a keyword heuristic, and injects the top-N
//! into the step-0 prompt. Later steps use a generic continuation
//! template around the accumulated context.

use steward_core::ToolSchema;

/// A worked example injected into the step-0 prompt.
#[derive(Debug, Clone)]
pub struct FewShotExample {
    /// Short task label, also used for relevance scoring.
    pub task: &'static str,
    /// The example user query.
    pub query: &'static str,
    /// The example reasoning.
    pub thinking: &'static str,
    /// The example tool call, in the exact sentinel format.
    pub tool_call: &'static str,
}

const BASE_SYSTEM_PROMPT: &str = "\
You are an expert MLOps Site Reliability Engineer managing Kubernetes clusters.
You have access to tools to check status, get logs, and search documentation.
Always think step by step and use tools when needed.

Important rules:
1. If you need information, search the knowledge base FIRST
2. Use tools to get real-time data from clusters
3. Provide clear, actionable responses
4. Always format tool calls in valid JSON
5. Map 'prod'/'production' to cluster_id='prod' and 'dev'/'development' to 'dev'";

fn exemplars() -> Vec<FewShotExample> {
    vec![
        FewShotExample {
            task: "Check cluster status",
            query: "Check the status of the production cluster",
            thinking: "The user wants the state of the production cluster. I should use \
                       the get_cluster_status tool with cluster_id='prod'.",
            tool_call: "<start_function_call>\ncall: get_cluster_status\n{\"cluster_id\": \"prod\"}\n<end_function_call>",
        },
        FewShotExample {
            task: "Get logs for issue",
            query: "Get logs for the failing api-service pod",
            thinking: "The user wants logs for a specific pod. I need to use get_pod_logs \
                       with the pod name and cluster.",
            tool_call: "<start_function_call>\ncall: get_pod_logs\n{\"cluster_id\": \"prod\", \"pod_name\": \"api-service\", \"tail_lines\": 50}\n<end_function_call>",
        },
        FewShotExample {
            task: "Search documentation",
            query: "What is the restart policy for critical services?",
            thinking: "The user is asking about policy information. I should search the \
                       knowledge base first.",
            tool_call: "<start_function_call>\ncall: search_knowledge_base\n{\"query\": \"restart policy critical services\"}\n<end_function_call>",
        },
        FewShotExample {
            task: "Multi-step troubleshooting",
            query: "The payment service is down, investigate",
            thinking: "I need to first check the pod status, then if it's degraded, get \
                       logs to understand why.",
            tool_call: "<start_function_call>\ncall: get_pod_status\n{\"cluster_id\": \"prod\"}\n<end_function_call>",
        },
    ]
}

/// Builds step-specific prompts with query-relevant few-shot exemplars.
pub struct PromptManager {
    examples: Vec<FewShotExample>,
    max_examples: usize,
}

impl PromptManager {
    /// Create a manager injecting at most `max_examples` exemplars into
    /// the step-0 prompt.
    pub fn new(max_examples: usize) -> Self {
        Self {
            examples: exemplars(),
            max_examples,
        }
    }

    /// Select the most relevant exemplars for a query: keyword-scored,
    /// sorted descending (stable, so fixed-set order breaks ties), top-N.
    pub fn select_examples(&self, query: &str) -> Vec<&FewShotExample> {
        let query_lower = query.to_lowercase();
        let mut scored: Vec<(f32, &FewShotExample)> = self
            .examples
            .iter()
            .map(|ex| (relevance_score(&query_lower, ex), ex))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored
            .into_iter()
            .take(self.max_examples)
            .map(|(_, ex)| ex)
            .collect()
    }

    /// The step-0 prompt: role, exemplars, tool list, format reminder,
    /// and the analysis template around the query.
    pub fn build_initial_prompt(&self, query: &str, tools: &[ToolSchema]) -> String {
        let mut parts = vec![BASE_SYSTEM_PROMPT.to_string()];

        let examples = self.select_examples(query);
        if !examples.is_empty() {
            parts.push("\nExamples:".to_string());
            for (i, example) in examples.iter().enumerate() {
                parts.push(format!("\nExample {}:", i + 1));
                parts.push(format!("Task: {}", example.task));
                parts.push(format!("Query: {}", example.query));
                parts.push(format!("Thinking: {}", example.thinking));
                parts.push(format!("Tool Call: {}", example.tool_call));
            }
        }

        parts.push("\nAvailable Tools:".to_string());
        for tool in tools {
            parts.push(format!("- {}: {}", tool.name, tool.description));
        }

        parts.push(
            "\nIMPORTANT: Always use this exact format for tool calls:\n\
             <start_function_call>\n\
             call: tool_name\n\
             {\"parameter\": \"value\"}\n\
             <end_function_call>"
                .to_string(),
        );

        parts.push(format!(
            "\nAnalyze this request step by step: {query}\n\n\
             Step 1: What is the user asking for?\n\
             Step 2: What information do I need?\n\
             Step 3: Should I search the knowledge base or use a tool?\n\
             Step 4: What specific action should I take?\n\n\
             Think carefully and then decide your action."
        ));

        parts.join("\n")
    }

    /// The continuation prompt for steps after the first, embedding the
    /// running context.
    pub fn build_continuation_prompt(&self, context: &str) -> String {
        format!(
            "Based on the previous steps, think about what to do next:\n\n\
             Context: {context}\n\n\
             What should I do next?\n\
             1. Search for more information?\n\
             2. Use a specific tool?\n\
             3. Provide the final answer?\n\n\
             Consider what information I still need to answer the user's question."
        )
    }
}

impl Default for PromptManager {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Keyword relevance of one exemplar for a query. Every exemplar gets a
/// small base score so the list is never empty when N > 0.
fn relevance_score(query_lower: &str, example: &FewShotExample) -> f32 {
    let task = example.task.to_lowercase();
    let example_query = example.query.to_lowercase();
    let mut score = 0.5f32;

    if query_lower.contains("status") && task.contains("status") {
        score += 2.0;
    }
    if query_lower.contains("log") && task.contains("log") {
        score += 2.0;
    }
    if (query_lower.contains("search")
        || query_lower.contains("documentation")
        || query_lower.contains("policy"))
        && task.contains("search")
    {
        score += 2.0;
    }
    if (query_lower.contains("down")
        || query_lower.contains("issue")
        || query_lower.contains("problem")
        || query_lower.contains("investigate"))
        && task.contains("troubleshooting")
    {
        score += 2.0;
    }
    if query_lower.contains("prod") && example_query.contains("prod") {
        score += 1.0;
    }
    if query_lower.contains("dev") && example_query.contains("dev") {
        score += 1.0;
    }

    score
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn schemas() -> Vec<ToolSchema> {
        vec![ToolSchema {
            name: "get_cluster_status".into(),
            description: "Get the status of a Kubernetes cluster".into(),
            parameters: serde_json::json!({"type": "object", "properties": {}}),
        }]
    }

    #[test]
    fn status_query_prefers_status_example() {
        let manager = PromptManager::new(2);
        let selected = manager.select_examples("Check the status of prod pods");
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[0].task, "Check cluster status");
    }

    #[test]
    fn outage_query_prefers_troubleshooting_example() {
        let manager = PromptManager::new(1);
        let selected = manager.select_examples("The payment service is down, investigate");
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].task, "Multi-step troubleshooting");
    }

    #[test]
    fn selection_respects_limit() {
        let manager = PromptManager::new(3);
        assert_eq!(manager.select_examples("anything").len(), 3);

        let none = PromptManager::new(0);
        assert!(none.select_examples("anything").is_empty());
    }

    #[test]
    fn unrelated_query_keeps_fixed_order() {
        // All exemplars tie at the base score; the stable sort keeps the
        // fixed-set order.
        let manager = PromptManager::new(2);
        let selected = manager.select_examples("hello there");
        assert_eq!(selected[0].task, "Check cluster status");
        assert_eq!(selected[1].task, "Get logs for issue");
    }

    #[test]
    fn initial_prompt_contains_everything() {
        let manager = PromptManager::new(2);
        let prompt = manager.build_initial_prompt("Check prod status", &schemas());

        assert!(prompt.contains("Site Reliability Engineer"));
        assert!(prompt.contains("Example 1:"));
        assert!(prompt.contains("- get_cluster_status:"));
        assert!(prompt.contains("<start_function_call>"));
        assert!(prompt.contains("Analyze this request step by step: Check prod status"));
    }

    #[test]
    fn continuation_prompt_embeds_context() {
        let manager = PromptManager::default();
        let prompt = manager.build_continuation_prompt("prior context here");
        assert!(prompt.contains("Context: prior context here"));
        assert!(prompt.contains("Provide the final answer?"));
    }
}
