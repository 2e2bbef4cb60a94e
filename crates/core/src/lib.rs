//! # Steward Core
//!
//! Domain types, traits, and error definitions for the Steward agent core.
//! This crate has **zero framework dependencies**: it defines the domain
//! model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! Every external collaborator of the reasoning loop is defined as a trait
//! here (generator, tool, failure sink, training sink). Implementations
//! live in their respective crates, constructed explicitly by the process
//! entry point and passed by reference. There is no global mutable state.

pub mod drift;
pub mod error;
pub mod generator;
pub mod message;
pub mod tool;
pub mod trace;
pub mod training;

// Re-export key types at crate root for ergonomics
pub use drift::{DriftKind, FailureSink, NullSink};
pub use error::{Error, GeneratorError, Result, ToolError};
pub use generator::Generator;
pub use message::{ChatMessage, Role};
pub use tool::{JsonMap, Tool, ToolRegistry, ToolSchema};
pub use trace::{AgentResult, CallStatus, ReasoningStep, StepKind, ToolCallRecord};
pub use training::TrainingSink;
