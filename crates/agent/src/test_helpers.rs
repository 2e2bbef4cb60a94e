//! Shared test helpers for engine tests.

use async_trait::async_trait;
use std::sync::Mutex;
use steward_core::error::GeneratorError;
use steward_core::{ChatMessage, DriftKind, FailureSink, Generator, ToolSchema};

/// A generator that returns a sequence of scripted raw outputs.
///
/// Each call to `generate` returns the next output in the queue.
/// Panics if more calls are made than outputs provided.
pub struct ScriptedGenerator {
    outputs: Vec<String>,
    cursor: Mutex<usize>,
}

impl ScriptedGenerator {
    pub fn new(outputs: Vec<&str>) -> Self {
        Self {
            outputs: outputs.into_iter().map(String::from).collect(),
            cursor: Mutex::new(0),
        }
    }

    /// A generator that emits the same raw output on every call.
    pub fn repeating(output: &str, times: usize) -> Self {
        Self::new(vec![output; times])
    }

    #[allow(dead_code)]
    pub fn calls_made(&self) -> usize {
        *self.cursor.lock().unwrap()
    }
}

#[async_trait]
impl Generator for ScriptedGenerator {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn generate(
        &self,
        _messages: &[ChatMessage],
        _tools: &[ToolSchema],
    ) -> Result<String, GeneratorError> {
        let mut cursor = self.cursor.lock().unwrap();
        if *cursor >= self.outputs.len() {
            panic!(
                "ScriptedGenerator: no more outputs (call #{}, have {})",
                *cursor,
                self.outputs.len()
            );
        }
        let output = self.outputs[*cursor].clone();
        *cursor += 1;
        Ok(output)
    }
}

/// A generator whose every call fails.
pub struct FailingGenerator;

#[async_trait]
impl Generator for FailingGenerator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(
        &self,
        _messages: &[ChatMessage],
        _tools: &[ToolSchema],
    ) -> Result<String, GeneratorError> {
        Err(GeneratorError::GenerationFailed("inference backend gone".into()))
    }
}

/// A failure sink that records every event for assertions.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(DriftKind, serde_json::Value)>>,
}

impl RecordingSink {
    pub fn count(&self, kind: DriftKind) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(k, _)| *k == kind)
            .count()
    }

    #[allow(dead_code)]
    pub fn events(&self) -> Vec<(DriftKind, serde_json::Value)> {
        self.events.lock().unwrap().clone()
    }
}

impl FailureSink for RecordingSink {
    fn record_reasoning_failure(&self, kind: DriftKind, details: serde_json::Value) {
        self.events.lock().unwrap().push((kind, details));
    }
}

/// A training sink that records the offered sessions.
#[derive(Default)]
pub struct RecordingCollector {
    pub sessions: Mutex<Vec<(String, usize, usize, String)>>,
}

impl steward_core::TrainingSink for RecordingCollector {
    fn collect(
        &self,
        instruction: &str,
        reasoning_trace: &[steward_core::ReasoningStep],
        tool_calls: &[steward_core::ToolCallRecord],
        output: &str,
        _metadata: serde_json::Value,
    ) -> bool {
        self.sessions.lock().unwrap().push((
            instruction.to_string(),
            reasoning_trace.len(),
            tool_calls.len(),
            output.to_string(),
        ));
        true
    }
}
