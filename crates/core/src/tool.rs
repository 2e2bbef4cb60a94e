//! Tool trait and registry: the abstraction over agent capabilities.
//!
//! Tools are what let the agent act on the world: check cluster status,
//! fetch pod logs, search the knowledge base. Every tool implements the
//! same capability interface and is dispatched by name through the
//! registry (lookup-then-invoke, never reflection).

use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A JSON object, the argument and result shape of every tool call.
pub type JsonMap = serde_json::Map<String, serde_json::Value>;

/// A tool description sent to the generator so it knows what it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSchema {
    /// The unique tool name
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// The core Tool trait.
///
/// Implementations must be safe to call from concurrent sessions:
/// `execute` takes `&self` and must not rely on mutable state shared
/// across calls beyond read-only configuration.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "get_cluster_status").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the generator).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments, returning a
    /// JSON-serializable result mapping.
    async fn execute(&self, arguments: serde_json::Value)
    -> std::result::Result<JsonMap, ToolError>;

    /// Convert this tool into a schema for the generator.
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// The reasoning loop uses this to:
/// 1. Get the schema list to send to the generator
/// 2. Look up and execute tools when the generator requests them
///
/// Registration is append-only and happens at process start, strictly
/// before concurrent execution begins; `execute` takes `&self` and is
/// safe to call from independent sessions.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
    /// Names in registration order. `names()` and `schemas()` must be
    /// stable across calls, which a bare HashMap would not give us.
    order: Vec<String>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name
    /// (the name keeps its original position in the registration order).
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        if !self.tools.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Whether a tool with this name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Get the schema for a single tool.
    pub fn schema(&self, name: &str) -> Option<ToolSchema> {
        self.tools.get(name).map(|t| t.schema())
    }

    /// All tool schemas, in registration order.
    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|t| t.schema())
            .collect()
    }

    /// All registered tool names, in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// Execute a tool by name.
    ///
    /// Fails with [`ToolError::NotFound`] for unregistered names. Any
    /// error raised by the tool implementation is wrapped as
    /// [`ToolError::ExecutionFailed`] carrying the original message.
    /// The registry performs no retries; retry policy belongs to the
    /// caller.
    pub async fn execute(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> std::result::Result<JsonMap, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        tool.execute(arguments).await.map_err(|e| match e {
            e @ ToolError::ExecutionFailed { .. } => e,
            other => ToolError::ExecutionFailed {
                tool_name: name.to_string(),
                reason: other.to_string(),
            },
        })
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A simple test tool for unit tests.
    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "Echoes back the input"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            })
        }
        async fn execute(
            &self,
            arguments: serde_json::Value,
        ) -> std::result::Result<JsonMap, ToolError> {
            let text = arguments["text"]
                .as_str()
                .ok_or_else(|| ToolError::InvalidArguments("Missing 'text' argument".into()))?;
            let mut out = JsonMap::new();
            out.insert("text".into(), serde_json::Value::String(text.to_string()));
            Ok(out)
        }
    }

    struct NamedTool(&'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn name(&self) -> &str {
            self.0
        }
        fn description(&self) -> &str {
            "placeholder"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({"type": "object", "properties": {}})
        }
        async fn execute(
            &self,
            _arguments: serde_json::Value,
        ) -> std::result::Result<JsonMap, ToolError> {
            Ok(JsonMap::new())
        }
    }

    #[test]
    fn registry_register_and_lookup() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));
        assert!(registry.get("echo").is_some());
        assert!(registry.contains("echo"));
        assert!(registry.get("nonexistent").is_none());
    }

    #[test]
    fn registry_preserves_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(NamedTool("zeta")));
        registry.register(Box::new(NamedTool("alpha")));
        registry.register(Box::new(NamedTool("mid")));
        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);

        let schemas = registry.schemas();
        assert_eq!(schemas.len(), 3);
        assert_eq!(schemas[0].name, "zeta");
        assert_eq!(schemas[2].name, "mid");
    }

    #[test]
    fn registry_overwrite_keeps_position() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(NamedTool("a")));
        registry.register(Box::new(NamedTool("b")));
        registry.register(Box::new(NamedTool("a")));
        assert_eq!(registry.names(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn registry_execute_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let result = registry
            .execute("echo", serde_json::json!({"text": "hello world"}))
            .await
            .unwrap();
        assert_eq!(result["text"], "hello world");
    }

    #[tokio::test]
    async fn registry_execute_missing_tool() {
        let registry = ToolRegistry::new();
        let err = registry
            .execute("nonexistent", serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::NotFound(_)));
    }

    #[tokio::test]
    async fn registry_wraps_tool_failures() {
        let mut registry = ToolRegistry::new();
        registry.register(Box::new(EchoTool));

        let err = registry
            .execute("echo", serde_json::json!({}))
            .await
            .unwrap_err();
        match err {
            ToolError::ExecutionFailed { tool_name, reason } => {
                assert_eq!(tool_name, "echo");
                assert!(reason.contains("Missing 'text'"));
            }
            other => panic!("Expected ExecutionFailed, got {other:?}"),
        }
    }

    #[test]
    fn tool_schema_adapter() {
        let tool = EchoTool;
        let schema = tool.schema();
        assert_eq!(schema.name, "echo");
        assert!(schema.parameters["properties"]["text"].is_object());
    }
}
