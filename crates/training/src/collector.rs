//! Quality-scored JSONL collection of completed sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use steward_core::{ReasoningStep, StepKind, ToolCallRecord, TrainingSink};
use thiserror::Error;
use tracing::{debug, info, warn};

/// How many buffered examples force a save even with auto-save off.
const BUFFER_LIMIT: usize = 100;

const DEFAULT_MIN_QUALITY: f64 = 0.5;

/// One row of the training JSONL file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingExample {
    pub timestamp: DateTime<Utc>,
    pub instruction: String,
    pub reasoning_trace: Vec<ReasoningStep>,
    pub tool_calls: Vec<ToolCallRecord>,
    pub output: String,
    pub quality_score: f64,
    #[serde(default)]
    pub metadata: serde_json::Value,
}

/// Aggregate statistics over a collected file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollectionStats {
    pub total_examples: usize,
    pub average_quality: f64,
    pub examples_with_tools: usize,
}

#[derive(Debug, Error)]
pub enum CollectorError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("corrupt training row: {0}")]
    CorruptRow(#[from] serde_json::Error),
}

/// Collects (instruction, trace, tool calls, output) tuples in JSONL
/// format for later fine-tuning.
pub struct TrainingDataCollector {
    output_file: PathBuf,
    auto_save: bool,
    min_quality_score: f64,
    buffer: Mutex<Vec<TrainingExample>>,
}

impl TrainingDataCollector {
    /// Create a collector writing to `output_file` (parent directories
    /// are created at save time). Auto-save on, quality gate at 0.5.
    pub fn new(output_file: impl Into<PathBuf>) -> Self {
        let output_file = output_file.into();
        info!(path = %output_file.display(), "training data collector initialized");
        Self {
            output_file,
            auto_save: true,
            min_quality_score: DEFAULT_MIN_QUALITY,
            buffer: Mutex::new(Vec::new()),
        }
    }

    /// Set the minimum quality score an example needs to be kept.
    pub fn with_min_quality_score(mut self, score: f64) -> Self {
        self.min_quality_score = score;
        self
    }

    /// Enable or disable saving after every accepted example.
    pub fn with_auto_save(mut self, enabled: bool) -> Self {
        self.auto_save = enabled;
        self
    }

    /// Force-save any buffered examples.
    pub fn flush(&self) -> Result<(), CollectorError> {
        let drained = self.drain_buffer();
        self.append_rows(&drained)
    }

    /// Statistics over everything collected so far. A missing file is an
    /// empty collection, not an error.
    pub fn statistics(&self) -> Result<CollectionStats, CollectorError> {
        if !self.output_file.exists() {
            return Ok(CollectionStats {
                total_examples: 0,
                average_quality: 0.0,
                examples_with_tools: 0,
            });
        }

        let file = fs::File::open(&self.output_file).map_err(|source| CollectorError::Io {
            path: self.output_file.clone(),
            source,
        })?;

        let mut total = 0usize;
        let mut quality_sum = 0.0f64;
        let mut with_tools = 0usize;
        for line in BufReader::new(file).lines() {
            let line = line.map_err(|source| CollectorError::Io {
                path: self.output_file.clone(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let example: TrainingExample = serde_json::from_str(&line)?;
            total += 1;
            quality_sum += example.quality_score;
            if !example.tool_calls.is_empty() {
                with_tools += 1;
            }
        }

        Ok(CollectionStats {
            total_examples: total,
            average_quality: if total > 0 { quality_sum / total as f64 } else { 0.0 },
            examples_with_tools: with_tools,
        })
    }

    fn drain_buffer(&self) -> Vec<TrainingExample> {
        match self.buffer.lock() {
            Ok(mut buffer) => std::mem::take(&mut *buffer),
            Err(_) => Vec::new(),
        }
    }

    fn append_rows(&self, rows: &[TrainingExample]) -> Result<(), CollectorError> {
        if rows.is_empty() {
            return Ok(());
        }
        if let Some(parent) = self.output_file.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|source| CollectorError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.output_file)
            .map_err(|source| CollectorError::Io {
                path: self.output_file.clone(),
                source,
            })?;

        for row in rows {
            let line = serde_json::to_string(row)?;
            writeln!(file, "{line}").map_err(|source| CollectorError::Io {
                path: self.output_file.clone(),
                source,
            })?;
        }

        debug!(count = rows.len(), path = %self.output_file.display(), "saved training examples");
        Ok(())
    }
}

impl TrainingSink for TrainingDataCollector {
    fn collect(
        &self,
        instruction: &str,
        reasoning_trace: &[ReasoningStep],
        tool_calls: &[ToolCallRecord],
        output: &str,
        metadata: serde_json::Value,
    ) -> bool {
        let quality_score = quality_score(instruction, reasoning_trace, tool_calls, output);
        if quality_score < self.min_quality_score {
            debug!(quality_score, "skipping low-quality training example");
            return false;
        }

        let example = TrainingExample {
            timestamp: Utc::now(),
            instruction: instruction.to_string(),
            reasoning_trace: reasoning_trace.to_vec(),
            tool_calls: tool_calls.to_vec(),
            output: output.to_string(),
            quality_score,
            metadata,
        };

        let should_save = {
            match self.buffer.lock() {
                Ok(mut buffer) => {
                    buffer.push(example);
                    self.auto_save || buffer.len() >= BUFFER_LIMIT
                }
                Err(_) => false,
            }
        };

        if should_save
            && let Err(e) = self.flush()
        {
            // Advisory by contract: log and move on.
            warn!(error = %e, "failed to save training data");
        }

        info!(quality_score, "collected training example");
        true
    }
}

/// Quality score in [0, 1] for one session:
/// instruction length, trace presence and multi-step bonus,
/// think/act/observe coverage, tool usage and success rate, and output
/// length plus word overlap with the instruction.
fn quality_score(
    instruction: &str,
    reasoning_trace: &[ReasoningStep],
    tool_calls: &[ToolCallRecord],
    output: &str,
) -> f64 {
    let mut score = 0.0;

    // 1. Instruction quality (non-empty, reasonable length)
    if (10..=1000).contains(&instruction.len()) {
        score += 0.2;
    }

    // 2. Reasoning trace quality
    if !reasoning_trace.is_empty() {
        score += 0.2;
        if reasoning_trace.len() > 1 {
            score += 0.1;
        }
        let kinds: HashSet<StepKind> = reasoning_trace.iter().map(|s| s.kind).collect();
        if kinds.contains(&StepKind::Think)
            || kinds.contains(&StepKind::Act)
            || kinds.contains(&StepKind::Observe)
        {
            score += 0.1;
        }
    }

    // 3. Tool usage quality
    if !tool_calls.is_empty() {
        score += 0.2;
        let success_rate =
            tool_calls.iter().filter(|c| c.is_success()).count() as f64 / tool_calls.len() as f64;
        score += 0.2 * success_rate;
    }

    // 4. Output quality
    if output.len() > 20 {
        score += 0.1;
        let instruction_words: HashSet<String> =
            instruction.to_lowercase().split_whitespace().map(String::from).collect();
        let output_words: HashSet<String> =
            output.to_lowercase().split_whitespace().map(String::from).collect();
        let overlap = instruction_words.intersection(&output_words).count() as f64
            / instruction_words.len().max(1) as f64;
        score += 0.1 * overlap.min(1.0);
    }

    score.min(1.0)
}

// ── Tests ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use steward_core::JsonMap;

    fn sample_trace() -> Vec<ReasoningStep> {
        vec![
            ReasoningStep::new(1, StepKind::Think, "User wants pod status"),
            ReasoningStep::new(1, StepKind::Act, "get_pod_status({\"cluster_id\":\"prod\"})"),
            ReasoningStep::new(1, StepKind::Observe, "Got pod status"),
        ]
    }

    fn sample_calls() -> Vec<ToolCallRecord> {
        let mut result = JsonMap::new();
        result.insert("status".into(), serde_json::json!("healthy"));
        vec![ToolCallRecord::succeeded(
            "get_pod_status",
            JsonMap::new(),
            result,
        )]
    }

    fn collector_in(dir: &tempfile::TempDir) -> TrainingDataCollector {
        TrainingDataCollector::new(dir.path().join("training_raw.jsonl"))
    }

    #[test]
    fn collects_and_persists_good_example() {
        let dir = tempfile::tempdir().unwrap();
        let collector = collector_in(&dir);

        let accepted = collector.collect(
            "Check pod status in production",
            &sample_trace(),
            &sample_calls(),
            "All pods in production are healthy.",
            serde_json::json!({"request_id": "test"}),
        );
        assert!(accepted);

        let content = fs::read_to_string(dir.path().join("training_raw.jsonl")).unwrap();
        let row: TrainingExample = serde_json::from_str(content.lines().next().unwrap()).unwrap();
        assert_eq!(row.instruction, "Check pod status in production");
        assert_eq!(row.reasoning_trace.len(), 3);
        assert_eq!(row.tool_calls.len(), 1);
        assert!(row.quality_score > 0.5);
    }

    #[test]
    fn rejects_low_quality_example() {
        let dir = tempfile::tempdir().unwrap();
        let collector = collector_in(&dir).with_min_quality_score(0.9);

        let accepted = collector.collect("hi", &[], &[], "ok", serde_json::json!({}));
        assert!(!accepted);
        assert!(!dir.path().join("training_raw.jsonl").exists());
    }

    #[test]
    fn buffers_until_flush_when_auto_save_off() {
        let dir = tempfile::tempdir().unwrap();
        let collector = collector_in(&dir).with_auto_save(false);

        collector.collect(
            "Check pod status in production",
            &sample_trace(),
            &sample_calls(),
            "All pods in production are healthy.",
            serde_json::json!({}),
        );
        assert!(!dir.path().join("training_raw.jsonl").exists());

        collector.flush().unwrap();
        let content = fs::read_to_string(dir.path().join("training_raw.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn statistics_over_collected_file() {
        let dir = tempfile::tempdir().unwrap();
        let collector = collector_in(&dir);

        for _ in 0..3 {
            collector.collect(
                "Check pod status in production",
                &sample_trace(),
                &sample_calls(),
                "All pods in production are healthy.",
                serde_json::json!({}),
            );
        }
        collector.collect(
            "What is the restart policy for critical services?",
            &sample_trace(),
            &[],
            "Rolling restarts with maxUnavailable=0 are the policy for critical services.",
            serde_json::json!({}),
        );

        let stats = collector.statistics().unwrap();
        assert_eq!(stats.total_examples, 4);
        assert_eq!(stats.examples_with_tools, 3);
        assert!(stats.average_quality > 0.0);
    }

    #[test]
    fn statistics_with_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let collector = collector_in(&dir);
        let stats = collector.statistics().unwrap();
        assert_eq!(stats.total_examples, 0);
    }

    #[test]
    fn quality_score_rewards_full_sessions() {
        let full = quality_score(
            "Check pod status in production",
            &sample_trace(),
            &sample_calls(),
            "All pods in production are healthy.",
        );
        let bare = quality_score("hi", &[], &[], "ok");
        assert!(full > 0.7, "full session scored {full}");
        assert!(bare < 0.3, "bare session scored {bare}");
    }

    #[test]
    fn quality_score_penalizes_failed_calls() {
        let failed = vec![ToolCallRecord::failed(
            "get_pod_status",
            JsonMap::new(),
            "boom",
        )];
        let with_failure = quality_score(
            "Check pod status in production",
            &sample_trace(),
            &failed,
            "All pods in production are healthy.",
        );
        let with_success = quality_score(
            "Check pod status in production",
            &sample_trace(),
            &sample_calls(),
            "All pods in production are healthy.",
        );
        assert!(with_success > with_failure);
    }
}
