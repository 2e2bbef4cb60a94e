//! Error types for the Steward domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum; the propagation policy
//! is deliberately asymmetric: tool- and parse-level failures are absorbed
//! into the reasoning trace as observations, while generator failures and
//! configuration errors abort the whole request.

use thiserror::Error;

/// The top-level error type for all Steward operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Generator errors (fatal to the request) ---
    #[error("Generator error: {0}")]
    Generator(#[from] GeneratorError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures from the text generator. These are fatal to the request:
/// the loop propagates them instead of absorbing them into the trace.
#[derive(Debug, Clone, Error)]
pub enum GeneratorError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Tool execution failed: {tool_name}: {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),
}
