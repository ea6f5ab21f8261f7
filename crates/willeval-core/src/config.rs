//! Willeval Configuration Management
//!
//! Handles configuration from environment variables, config files,
//! and command-line arguments with defaults matching historical runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default similarity a matched pair needs to count as a true positive
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.7;

/// Default weight of the type agreement term in entity similarity
pub const DEFAULT_ENTITY_TYPE_WEIGHT: f64 = 0.7;

/// Default weight of the mention text term in entity similarity
pub const DEFAULT_ENTITY_TEXT_WEIGHT: f64 = 0.3;

/// Main application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Scoring configuration
    pub scoring: ScoringConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl EvalConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().with_env_override()
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path,
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(mut self) -> Result<Self, ConfigError> {
        if let Ok(threshold) = std::env::var("WILLEVAL_THRESHOLD") {
            self.scoring.similarity_threshold = parse_unit_interval("WILLEVAL_THRESHOLD", &threshold)?;
        }
        if let Ok(mode) = std::env::var("WILLEVAL_SCORING_MODE") {
            self.scoring.mode = mode.parse()?;
        }
        if let Ok(weight) = std::env::var("WILLEVAL_TYPE_WEIGHT") {
            let type_weight = parse_unit_interval("WILLEVAL_TYPE_WEIGHT", &weight)?;
            self.scoring = self.scoring.with_entity_weights(type_weight, 1.0 - type_weight);
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            self.logging.json_format = matches!(json.to_lowercase().as_str(), "1" | "true" | "yes");
        }

        Ok(self)
    }

    /// Reject values the scorer cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.scoring.validate()
    }
}

fn parse_unit_interval(key: &str, value: &str) -> Result<f64, ConfigError> {
    let parsed: f64 = value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })?;
    if !(0.0..=1.0).contains(&parsed) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
        });
    }
    Ok(parsed)
}

/// Scoring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Minimum similarity for a matched pair to be accepted
    pub similarity_threshold: f64,

    /// Accounting used when several events share a type
    pub mode: ScoringMode,

    /// Weight of type agreement in entity similarity
    pub entity_type_weight: f64,

    /// Weight of mention text similarity in entity similarity
    pub entity_text_weight: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: DEFAULT_SIMILARITY_THRESHOLD,
            mode: ScoringMode::Legacy,
            entity_type_weight: DEFAULT_ENTITY_TYPE_WEIGHT,
            entity_text_weight: DEFAULT_ENTITY_TEXT_WEIGHT,
        }
    }
}

impl ScoringConfig {
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn with_mode(mut self, mode: ScoringMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_entity_weights(mut self, type_weight: f64, text_weight: f64) -> Self {
        self.entity_type_weight = type_weight;
        self.entity_text_weight = text_weight;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.similarity_threshold) {
            return Err(ConfigError::InvalidValue {
                key: "scoring.similarity_threshold".to_string(),
                value: self.similarity_threshold.to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.entity_type_weight) {
            return Err(ConfigError::InvalidValue {
                key: "scoring.entity_type_weight".to_string(),
                value: self.entity_type_weight.to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.entity_text_weight)
            || (self.entity_type_weight + self.entity_text_weight - 1.0).abs() > 1e-9
        {
            return Err(ConfigError::InvalidValue {
                key: "scoring.entity_text_weight".to_string(),
                value: self.entity_text_weight.to_string(),
            });
        }
        Ok(())
    }
}

/// Event accounting for types with more than one gold or predicted record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Adds the full per-type gold and prediction counts on top of the
    /// per-pair outcomes. Reproduces previously published numbers.
    #[default]
    Legacy,
    /// Adds only the records the matcher left unpaired.
    Strict,
}

impl ScoringMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Legacy => "legacy",
            Self::Strict => "strict",
        }
    }
}

impl std::fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for ScoringMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "legacy" => Ok(Self::Legacy),
            "strict" => Ok(Self::Strict),
            _ => Err(ConfigError::InvalidValue {
                key: "WILLEVAL_SCORING_MODE".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
