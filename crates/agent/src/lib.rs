//! The Steward reasoning loop.
//!
//! The engine drives a bounded **Think → Act → Observe** cycle:
//!
//! 1. **Think**: build a step-specific prompt and ask the generator for
//!    a thought (step 0 embeds selected few-shot exemplars, later steps
//!    embed the running context)
//! 2. **Act**: if the thought names a tool, parse and repair its
//!    arguments and dispatch through the registry
//! 3. **Observe**: fold the result (or the failure) back into the
//!    context and go around again
//!
//! The loop exits when the thought signals a final answer, when it
//! contains no tool call (plain text is the answer), or when the step
//! budget runs out (a deterministic fallback response, not an error).

pub mod engine;
pub mod parser;
pub mod prompts;
pub mod session;

pub use engine::ReactEngine;
pub use parser::{ParseError, ToolInvocation, parse_tool_call, repair_json};
pub use prompts::{FewShotExample, PromptManager};
pub use session::{LoopState, call_signature};

#[cfg(test)]
pub(crate) mod test_helpers;
