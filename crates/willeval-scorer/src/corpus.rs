//! Corpus evaluation over parallel gold and prediction directories
//!
//! Each document pair is loaded, validated and scored independently. Any
//! per-document failure degrades to worst-case counts for that pair so the
//! corpus totals can always be computed; only a corpus size mismatch or an
//! unreadable directory aborts the run.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};
use willeval_core::{Document, EvalError, Result, ScoringConfig};

use crate::confusion::Scorer;
use crate::metrics::{AggregateMetrics, ConfusionCounts, DocumentCounts, Metrics};
use crate::report::CorpusReport;

// ============================================================================
// Loading
// ============================================================================

/// Read and parse a JSON file without assuming any schema
pub fn read_json_file(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).map_err(|source| EvalError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    serde_json::from_str(&content).map_err(|source| EvalError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Validate a parsed JSON value as an annotated document
pub fn parse_document(path: &Path, value: &Value) -> Result<Document> {
    Document::deserialize(value).map_err(|e| EvalError::Schema {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and validate a document file
pub fn load_document(path: &Path) -> Result<Document> {
    let value = read_json_file(path)?;
    parse_document(path, &value)
}

fn raw_len(value: &Value, key: &str) -> usize {
    value.get(key).and_then(Value::as_array).map_or(0, Vec::len)
}

/// Whether the first predicted entity carries a mention list
fn first_entity_has_texts(value: &Value) -> bool {
    value
        .get("entities")
        .and_then(Value::as_array)
        .and_then(|entities| entities.first())
        .is_some_and(|entity| entity.get("texts").is_some())
}

// ============================================================================
// Document Results
// ============================================================================

/// How a document pair was scored
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Both documents loaded and were fully compared
    Scored,
    /// The prediction has no entities; only events were counted
    NoPredictedEntities,
    /// The prediction does not have the expected shape
    FormatIssue,
    /// The prediction file could not be read or parsed
    PredictionUnreadable,
    /// The gold file could not be read or parsed
    GoldUnreadable,
    /// Neither file could be read or parsed
    BothUnreadable,
}

impl DocumentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scored => "scored",
            Self::NoPredictedEntities => "no_predicted_entities",
            Self::FormatIssue => "format_issue",
            Self::PredictionUnreadable => "prediction_unreadable",
            Self::GoldUnreadable => "gold_unreadable",
            Self::BothUnreadable => "both_unreadable",
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Scores of one gold/prediction document pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentResult {
    pub gold_path: PathBuf,
    pub prediction_path: PathBuf,
    pub status: DocumentStatus,
    pub counts: DocumentCounts,
}

impl DocumentResult {
    pub fn entity_metrics(&self) -> Metrics {
        self.counts.entity.metrics()
    }

    pub fn event_metrics(&self) -> Metrics {
        self.counts.event.metrics()
    }
}

// ============================================================================
// Corpus Layout
// ============================================================================

/// Where the gold and prediction files of a corpus live.
///
/// Document `n` is `<dir>/<prefix><n>.json` on each side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusLayout {
    pub gold_dir: PathBuf,
    pub prediction_dir: PathBuf,
    pub gold_prefix: String,
    pub prediction_prefix: String,
}

impl CorpusLayout {
    pub fn new(
        gold_dir: impl Into<PathBuf>,
        prediction_dir: impl Into<PathBuf>,
        gold_prefix: impl Into<String>,
        prediction_prefix: impl Into<String>,
    ) -> Self {
        Self {
            gold_dir: gold_dir.into(),
            prediction_dir: prediction_dir.into(),
            gold_prefix: gold_prefix.into(),
            prediction_prefix: prediction_prefix.into(),
        }
    }

    pub fn gold_path(&self, index: usize) -> PathBuf {
        self.gold_dir.join(format!("{}{}.json", self.gold_prefix, index))
    }

    pub fn prediction_path(&self, index: usize) -> PathBuf {
        self.prediction_dir
            .join(format!("{}{}.json", self.prediction_prefix, index))
    }

    /// Number of document pairs, failing if the two sides disagree
    pub fn document_count(&self) -> Result<usize> {
        let gold = count_json_files(&self.gold_dir)?;
        let prediction = count_json_files(&self.prediction_dir)?;
        if gold != prediction {
            return Err(EvalError::CorpusSizeMismatch { gold, prediction });
        }
        Ok(gold)
    }
}

/// Count regular files with a `.json` extension directly inside `dir`
pub fn count_json_files(dir: &Path) -> Result<usize> {
    let io_error = |source| EvalError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut count = 0;
    for entry in fs::read_dir(dir).map_err(io_error)? {
        let path = entry.map_err(io_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "json") {
            count += 1;
        }
    }
    Ok(count)
}

// ============================================================================
// Corpus Evaluator
// ============================================================================

/// Evaluates document pairs and whole corpora
#[derive(Debug, Clone, Default)]
pub struct CorpusEvaluator {
    scorer: Scorer,
}

impl CorpusEvaluator {
    pub fn new(config: ScoringConfig) -> Self {
        Self {
            scorer: Scorer::new(config),
        }
    }

    pub fn scorer(&self) -> &Scorer {
        &self.scorer
    }

    /// Score every document pair of the corpus in index order
    pub fn evaluate(&self, layout: &CorpusLayout) -> Result<CorpusReport> {
        let count = layout.document_count()?;
        info!(documents = count, "evaluating corpus");

        let mut totals = AggregateMetrics::default();
        let mut rows = Vec::with_capacity(count);

        for index in 0..count {
            info!(index, "processing document");
            let result = self.evaluate_pair(&layout.gold_path(index), &layout.prediction_path(index));
            totals.add_document(&result.counts);
            rows.push(result);
        }

        Ok(CorpusReport::new(rows, totals, self.scorer.config().clone()))
    }

    /// Load and score one document pair; never fails
    pub fn evaluate_pair(&self, gold_path: &Path, prediction_path: &Path) -> DocumentResult {
        let gold = read_json_file(gold_path)
            .inspect_err(|e| warn!(error = %e, "failed to load gold document"))
            .ok();
        let prediction = read_json_file(prediction_path)
            .inspect_err(|e| warn!(error = %e, "failed to load prediction document"))
            .ok();

        let (status, counts) =
            self.evaluate_values(gold_path, gold.as_ref(), prediction_path, prediction.as_ref());

        DocumentResult {
            gold_path: gold_path.to_path_buf(),
            prediction_path: prediction_path.to_path_buf(),
            status,
            counts,
        }
    }

    /// Score already-parsed JSON values, degrading on missing or malformed input
    pub fn evaluate_values(
        &self,
        gold_path: &Path,
        gold: Option<&Value>,
        prediction_path: &Path,
        prediction: Option<&Value>,
    ) -> (DocumentStatus, DocumentCounts) {
        let (gold, prediction) = match (gold, prediction) {
            (Some(gold), Some(prediction)) => (gold, prediction),
            (Some(gold), None) => {
                return (DocumentStatus::PredictionUnreadable, format_failure(Some(gold), None));
            }
            (None, Some(prediction)) => {
                return (DocumentStatus::GoldUnreadable, format_failure(None, Some(prediction)));
            }
            (None, None) => return (DocumentStatus::BothUnreadable, DocumentCounts::default()),
        };

        if raw_len(prediction, "entities") == 0 {
            warn!(path = %prediction_path.display(), "no entity extracted");
            let counts = DocumentCounts {
                entity: ConfusionCounts::default(),
                event: ConfusionCounts::new(
                    0,
                    raw_len(prediction, "events"),
                    raw_len(gold, "events"),
                ),
            };
            return (DocumentStatus::NoPredictedEntities, counts);
        }

        if !first_entity_has_texts(prediction) {
            warn!(path = %prediction_path.display(), "prediction entities have no mention list");
            return (
                DocumentStatus::FormatIssue,
                format_failure(Some(gold), Some(prediction)),
            );
        }

        let documents = parse_document(gold_path, gold)
            .and_then(|gold| Ok((gold, parse_document(prediction_path, prediction)?)));
        match documents {
            Ok((gold, prediction)) => (
                DocumentStatus::Scored,
                self.scorer.score_document(&gold, &prediction),
            ),
            Err(e) => {
                warn!(error = %e, "document failed validation");
                (
                    DocumentStatus::FormatIssue,
                    format_failure(Some(gold), Some(prediction)),
                )
            }
        }
    }
}

/// Worst-case counts: every predicted record is a false positive and every
/// gold record a false negative
fn format_failure(gold: Option<&Value>, prediction: Option<&Value>) -> DocumentCounts {
    let count = |value: Option<&Value>, key: &str| value.map_or(0, |v| raw_len(v, key));
    DocumentCounts {
        entity: ConfusionCounts::new(
            0,
            count(prediction, "entities"),
            count(gold, "entities"),
        ),
        event: ConfusionCounts::new(0, count(prediction, "events"), count(gold, "events")),
    }
}
