//! Scripted generator for offline replay of the reasoning loop.
//!
//! A transcript is a JSON array of raw generator outputs, consumed in
//! order. This makes the whole state machine drivable from a file: the
//! same way the loop is exercised in tests, but against the real
//! registry and configuration. An exhausted transcript surfaces as a
//! generator failure, which the loop treats as fatal, so keep one
//! output per expected Think step.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;
use steward_core::error::GeneratorError;
use steward_core::{ChatMessage, Generator, ToolSchema};

pub struct ReplayGenerator {
    outputs: Mutex<VecDeque<String>>,
}

impl ReplayGenerator {
    pub fn new(outputs: Vec<String>) -> Self {
        Self {
            outputs: Mutex::new(outputs.into()),
        }
    }
}

#[async_trait]
impl Generator for ReplayGenerator {
    fn name(&self) -> &str {
        "replay"
    }

    async fn generate(
        &self,
        _messages: &[ChatMessage],
        _tools: &[ToolSchema],
    ) -> std::result::Result<String, GeneratorError> {
        self.outputs
            .lock()
            .ok()
            .and_then(|mut queue| queue.pop_front())
            .ok_or_else(|| GeneratorError::GenerationFailed("replay transcript exhausted".into()))
    }
}

/// Read a transcript file: a non-empty JSON array of strings.
pub fn load_transcript(path: &Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("cannot read transcript {}", path.display()))?;
    let outputs: Vec<String> =
        serde_json::from_str(&text).context("transcript must be a JSON array of strings")?;
    if outputs.is_empty() {
        anyhow::bail!("transcript is empty");
    }
    Ok(outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn replays_in_order_then_fails() {
        let generator = ReplayGenerator::new(vec!["first".into(), "second".into()]);
        assert_eq!(generator.generate(&[], &[]).await.unwrap(), "first");
        assert_eq!(generator.generate(&[], &[]).await.unwrap(), "second");
        assert!(generator.generate(&[], &[]).await.is_err());
    }

    #[test]
    fn loads_valid_transcript() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"["Final answer: ok"]"#).unwrap();
        let outputs = load_transcript(file.path()).unwrap();
        assert_eq!(outputs, vec!["Final answer: ok"]);
    }

    #[test]
    fn rejects_empty_or_malformed_transcripts() {
        let mut empty = tempfile::NamedTempFile::new().unwrap();
        write!(empty, "[]").unwrap();
        assert!(load_transcript(empty.path()).is_err());

        let mut bad = tempfile::NamedTempFile::new().unwrap();
        write!(bad, "{{}}").unwrap();
        assert!(load_transcript(bad.path()).is_err());
    }
}
