//! Generator trait: the abstraction over the text generator.
//!
//! A Generator knows how to turn a conversation plus a tool-schema list
//! into raw text. Model loading and inference mechanics live entirely
//! behind this trait; the reasoning loop treats it as an opaque,
//! blocking text source. When the model wants to call a tool it emits
//! the call-delimiter protocol inside the raw text:
//!
//! ```text
//! <start_function_call>call:get_cluster_status{"cluster_id": "prod"}<end_function_call>
//! ```
//!
//! A generator failure is fatal to the request: the loop propagates it
//! to the caller instead of absorbing it into the trace.

use crate::error::GeneratorError;
use crate::message::ChatMessage;
use crate::tool::ToolSchema;
use async_trait::async_trait;

/// The core Generator trait.
#[async_trait]
pub trait Generator: Send + Sync {
    /// A human-readable name for this generator (e.g., "functiongemma").
    fn name(&self) -> &str;

    /// Generate raw text from an ordered conversation and the available
    /// tool schemas. No output caching across sessions or steps: each
    /// call is independent.
    async fn generate(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSchema],
    ) -> std::result::Result<String, GeneratorError>;
}
