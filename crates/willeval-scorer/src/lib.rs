//! Willeval Scorer - Entity and event matching for extraction evaluation
//!
//! Compares predicted will annotations against a gold standard:
//! - Fuzzy string similarity and entity/event similarity functions
//! - Greedy alignment of entities, mentions and events
//! - Confusion counts and precision/recall/F1 per document and corpus
//! - Corpus evaluation with CSV and JSON reports

pub mod confusion;
pub mod corpus;
pub mod grouping;
pub mod matcher;
pub mod metrics;
pub mod remap;
pub mod report;
pub mod sequence;
pub mod similarity;
pub mod span;

pub use confusion::Scorer;
pub use corpus::{CorpusEvaluator, CorpusLayout, DocumentResult, DocumentStatus};
pub use matcher::{align_records, Alignment, IdMap, MatchPair, Record};
pub use metrics::{AggregateMetrics, ConfusionCounts, DocumentCounts, Metrics};
pub use report::{CorpusReport, REPORT_FILE_NAME};
pub use sequence::ratio;
pub use similarity::{entity_similarity, event_similarity, one_to_one_similarity, EntityWeights};
