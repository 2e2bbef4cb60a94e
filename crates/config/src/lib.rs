//! Configuration loading, validation, and management for Steward.
//!
//! Loads configuration from `steward.toml` with `STEWARD_*` environment
//! variable overrides. Validates all settings before they reach the
//! engine.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// The root configuration structure.
///
/// Maps directly to `steward.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generator/model settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Reasoning-loop settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Training-data collection settings
    #[serde(default)]
    pub training: TrainingConfig,

    /// Logging settings
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Model identifier handed to the generator implementation.
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Generation cap per call.
    #[serde(default = "default_max_new_tokens")]
    pub max_new_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum Think iterations per request.
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Few-shot exemplars embedded in the step-0 prompt.
    #[serde(default = "default_few_shot_examples")]
    pub few_shot_examples: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Whether completed sessions are collected.
    #[serde(default)]
    pub enabled: bool,

    /// JSONL output path.
    #[serde(default = "default_training_output")]
    pub output_file: PathBuf,

    /// Quality gate in [0, 1].
    #[serde(default = "default_min_quality_score")]
    pub min_quality_score: f64,

    /// Save after every accepted example.
    #[serde(default = "default_true")]
    pub auto_save: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log filter (e.g. "info", "steward_agent=debug").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON-formatted logs.
    #[serde(default)]
    pub json: bool,
}

fn default_model_id() -> String {
    "functiongemma-270m-it".into()
}
fn default_max_new_tokens() -> u32 {
    256
}
fn default_max_steps() -> usize {
    5
}
fn default_few_shot_examples() -> usize {
    2
}
fn default_training_output() -> PathBuf {
    PathBuf::from("./data/training_raw.jsonl")
}
fn default_min_quality_score() -> f64 {
    0.5
}
fn default_true() -> bool {
    true
}
fn default_log_level() -> String {
    "info".into()
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            max_new_tokens: default_max_new_tokens(),
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            few_shot_examples: default_few_shot_examples(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            output_file: default_training_output(),
            min_quality_score: default_min_quality_score(),
            auto_save: true,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

impl AppConfig {
    /// Load from a TOML file, then apply environment overrides and
    /// validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config: AppConfig = toml::from_str(&text)?;
        debug!(path = %path.display(), "loaded configuration file");
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load from a file when given (and existing), else start from
    /// defaults. Environment overrides and validation apply either way.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) if p.exists() => Self::load(p),
            _ => {
                let mut config = AppConfig::default();
                config.apply_env_overrides();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Apply `STEWARD_*` environment variable overrides.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Override fields from a key lookup (the environment in
    /// production; injectable for tests).
    pub fn apply_overrides_from<F>(&mut self, get: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = get("STEWARD_MODEL_ID") {
            self.model.model_id = v;
        }
        if let Some(v) = get("STEWARD_MAX_NEW_TOKENS")
            && let Ok(n) = v.parse()
        {
            self.model.max_new_tokens = n;
        }
        if let Some(v) = get("STEWARD_MAX_STEPS")
            && let Ok(n) = v.parse()
        {
            self.agent.max_steps = n;
        }
        if let Some(v) = get("STEWARD_FEW_SHOT_EXAMPLES")
            && let Ok(n) = v.parse()
        {
            self.agent.few_shot_examples = n;
        }
        if let Some(v) = get("STEWARD_TRAINING_ENABLED")
            && let Ok(b) = v.parse()
        {
            self.training.enabled = b;
        }
        if let Some(v) = get("STEWARD_LOG_LEVEL") {
            self.log.level = v;
        }
    }

    /// Check every setting the engine depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agent.max_steps == 0 {
            return Err(ConfigError::Invalid {
                message: "agent.max_steps must be at least 1".into(),
            });
        }
        if self.model.max_new_tokens == 0 {
            return Err(ConfigError::Invalid {
                message: "model.max_new_tokens must be positive".into(),
            });
        }
        if !(0.0..=1.0).contains(&self.training.min_quality_score) {
            return Err(ConfigError::Invalid {
                message: "training.min_quality_score must be within [0, 1]".into(),
            });
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────
