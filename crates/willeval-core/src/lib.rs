//! Willeval Core - Domain models, errors and shared configuration
//!
//! This crate defines the types shared by the evaluation workspace:
//! - Annotation models (entities, events, documents)
//! - Common error types
//! - Configuration management

pub mod config;

pub use config::{ConfigError, EvalConfig, LoggingConfig, ScoringConfig, ScoringMode};

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Core error types for evaluation runs
#[derive(Error, Debug)]
pub enum EvalError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unexpected document shape in {path}: {message}")]
    Schema { path: PathBuf, message: String },

    #[error("Corpus size mismatch: {gold} gold files but {prediction} prediction files")]
    CorpusSizeMismatch { gold: usize, prediction: usize },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, EvalError>;

// ============================================================================
// Annotation Models
// ============================================================================

/// A coreference-resolved entity: every surface mention of one participant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Identifier, unique within one document's entity list
    pub id: String,

    /// Closed-vocabulary label (e.g. "Testator", "Beneficiary", "Asset")
    #[serde(rename = "type")]
    pub entity_type: String,

    /// Surface mentions merged into this entity
    pub texts: Vec<String>,
}

impl Entity {
    pub fn new(
        id: impl Into<String>,
        entity_type: impl Into<String>,
        texts: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            texts: texts.into_iter().map(Into::into).collect(),
        }
    }
}

/// Entity identifiers filling one argument role of an event.
///
/// Accepts either a JSON list of identifiers or a single identifier string,
/// which is normalised to a one-element list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawRoleFillers", into = "Vec<String>")]
pub struct RoleFillers(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawRoleFillers {
    Many(Vec<String>),
    One(String),
}

impl From<RawRoleFillers> for RoleFillers {
    fn from(raw: RawRoleFillers) -> Self {
        match raw {
            RawRoleFillers::Many(ids) => Self(ids),
            RawRoleFillers::One(id) => Self(vec![id]),
        }
    }
}

impl From<RoleFillers> for Vec<String> {
    fn from(fillers: RoleFillers) -> Self {
        fillers.0
    }
}

impl RoleFillers {
    pub fn new(ids: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(ids.into_iter().map(Into::into).collect())
    }

    pub fn ids(&self) -> &[String] {
        &self.0
    }

    pub fn ids_mut(&mut self) -> &mut [String] {
        &mut self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.0.iter().any(|candidate| candidate == id)
    }
}

/// A typed event frame whose argument roles reference entity identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    #[serde(default)]
    pub id: String,

    /// Event type; events without one are skipped during grouping
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    /// Argument role name -> entity identifiers filling it
    #[serde(flatten)]
    pub arguments: BTreeMap<String, RoleFillers>,
}

impl Event {
    pub fn new(id: impl Into<String>, event_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            event_type: Some(event_type.into()),
            arguments: BTreeMap::new(),
        }
    }

    /// Add an argument role (builder style)
    pub fn with_role(
        mut self,
        role: impl Into<String>,
        ids: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.arguments.insert(role.into(), RoleFillers::new(ids));
        self
    }

    pub fn role(&self, role: &str) -> Option<&RoleFillers> {
        self.arguments.get(role)
    }
}

/// One annotated text: either the gold standard or a prediction
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub entities: Vec<Entity>,

    #[serde(default)]
    pub events: Vec<Event>,
}

impl Document {
    pub fn new(entities: Vec<Entity>, events: Vec<Event>) -> Self {
        Self {
            text: String::new(),
            entities,
            events,
        }
    }

    /// Total number of surface mentions across all entities
    pub fn mention_count(&self) -> usize {
        self.entities.iter().map(|entity| entity.texts.len()).sum()
    }
}
