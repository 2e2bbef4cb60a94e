//! Training-example collection for Steward.
//!
//! Completed reasoning sessions are worth keeping: the
//! (instruction, trace, tool calls, output) tuples are exactly the
//! fine-tuning format the generator is trained on. The collector scores
//! each session with a cheap quality heuristic, gates on a minimum
//! score, and appends accepted examples to a JSONL file.
//!
//! Collection is advisory by contract: the loop offers a session and
//! moves on. I/O failures are logged and swallowed, never surfaced to
//! the request.

pub mod collector;

pub use collector::{CollectionStats, CollectorError, TrainingDataCollector, TrainingExample};
