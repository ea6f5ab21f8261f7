//! Corpus Evaluation Integration Tests
//!
//! Builds gold and prediction directories on disk and runs the full
//! load -> score -> report pipeline over them.

use std::fs;
use std::path::Path;

use serde_json::{json, Value};
use tempfile::TempDir;
use willeval_core::{EvalError, ScoringConfig, ScoringMode};
use willeval_scorer::{ConfusionCounts, CorpusEvaluator, CorpusLayout, DocumentStatus, REPORT_FILE_NAME};

/// Gold and prediction directories under one temporary root
struct Corpus {
    root: TempDir,
}

impl Corpus {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        fs::create_dir(root.path().join("gold")).unwrap();
        fs::create_dir(root.path().join("pred")).unwrap();
        fs::create_dir(root.path().join("out")).unwrap();
        Self { root }
    }

    fn write(&self, side: &str, name: &str, content: &str) {
        fs::write(self.root.path().join(side).join(name), content).unwrap();
    }

    fn add_pair(&self, index: usize, gold: Value, prediction: Value) {
        self.write("gold", &format!("will_{index}.json"), &gold.to_string());
        self.write("pred", &format!("out_{index}.json"), &prediction.to_string());
    }

    fn layout(&self) -> CorpusLayout {
        CorpusLayout::new(
            self.root.path().join("gold"),
            self.root.path().join("pred"),
            "will_",
            "out_",
        )
    }

    fn output_dir(&self) -> &Path {
        self.root.path()
    }
}

fn entity(id: &str, entity_type: &str, texts: &[&str]) -> Value {
    json!({"id": id, "type": entity_type, "texts": texts})
}

// =============================================================================
// End-to-end Scenarios
// =============================================================================

#[test]
fn test_identical_single_entity() {
    let corpus = Corpus::new();
    let document = json!({"entities": [entity("e1", "Testator", &["John Smith"])], "events": []});
    corpus.add_pair(0, document.clone(), document);

    let report = CorpusEvaluator::default().evaluate(&corpus.layout()).unwrap();

    assert_eq!(report.documents.len(), 1);
    assert_eq!(report.documents[0].status, DocumentStatus::Scored);
    assert_eq!(report.totals.counts.entity, ConfusionCounts::new(1, 0, 0));
}

#[test]
fn test_missing_event_type_is_false_negative() {
    let corpus = Corpus::new();
    let entities = json!([entity("e1", "Testator", &["John Smith"]), entity("e2", "Asset", &["my house"])]);
    corpus.add_pair(
        0,
        json!({"entities": entities, "events": [{"id": "v1", "type": "Bequest", "Asset": ["e2"]}]}),
        json!({"entities": entities, "events": []}),
    );

    let report = CorpusEvaluator::default().evaluate(&corpus.layout()).unwrap();

    assert_eq!(report.totals.counts.event, ConfusionCounts::new(0, 0, 1));
}

#[test]
fn test_single_events_that_disagree() {
    let corpus = Corpus::new();
    let entities = json!([
        entity("e1", "Testator", &["John Smith"]),
        entity("e4", "Witness", &["Alice Brown"])
    ]);
    corpus.add_pair(
        0,
        json!({"entities": entities, "events": [{"id": "v1", "type": "SignWill", "Testator": ["e1"]}]}),
        json!({"entities": entities, "events": [{"id": "v1", "type": "SignWill", "Witness": ["e4"]}]}),
    );

    let report = CorpusEvaluator::default().evaluate(&corpus.layout()).unwrap();

    assert_eq!(report.totals.counts.event, ConfusionCounts::new(0, 1, 1));
}

#[test]
fn test_two_document_aggregate() {
    let corpus = Corpus::new();
    let first = json!({
        "entities": [entity("e1", "Testator", &["John Smith"]), entity("e2", "Asset", &["my house"])],
        "events": []
    });
    corpus.add_pair(0, first.clone(), first);
    corpus.add_pair(
        1,
        json!({"entities": [entity("e1", "Asset", &["my house"])], "events": []}),
        json!({"entities": [entity("T1", "Asset", &["car"])], "events": []}),
    );

    let report = CorpusEvaluator::default().evaluate(&corpus.layout()).unwrap();

    assert_eq!(report.documents[0].counts.entity, ConfusionCounts::new(2, 0, 0));
    assert_eq!(report.documents[1].counts.entity, ConfusionCounts::new(0, 1, 1));

    let metrics = report.totals.entity_metrics();
    assert!((metrics.precision - 2.0 / 3.0).abs() < 1e-12);
    assert!((metrics.recall - 2.0 / 3.0).abs() < 1e-12);
    assert!((metrics.f1 - 2.0 / 3.0).abs() < 1e-12);
}

// =============================================================================
// Degraded Inputs
// =============================================================================

#[test]
fn test_corpus_size_mismatch_is_fatal() {
    let corpus = Corpus::new();
    let document = json!({"entities": [], "events": []});
    corpus.add_pair(0, document.clone(), document.clone());
    corpus.write("gold", "will_1.json", &document.to_string());

    let result = CorpusEvaluator::default().evaluate(&corpus.layout());

    assert!(matches!(
        result,
        Err(EvalError::CorpusSizeMismatch { gold: 2, prediction: 1 })
    ));
}

#[test]
fn test_non_json_files_are_not_counted() {
    let corpus = Corpus::new();
    let document = json!({"entities": [entity("e1", "Asset", &["house"])], "events": []});
    corpus.add_pair(0, document.clone(), document);
    corpus.write("pred", "notes.txt", "not part of the corpus");

    let report = CorpusEvaluator::default().evaluate(&corpus.layout()).unwrap();
    assert_eq!(report.totals.num_documents, 1);
}

#[test]
fn test_malformed_prediction_counts_gold_as_missed() {
    let corpus = Corpus::new();
    corpus.write(
        "gold",
        "will_0.json",
        &json!({
            "entities": [entity("e1", "Testator", &["John Smith"]), entity("e2", "Asset", &["my house"])],
            "events": [{"id": "v1", "type": "Bequest", "Asset": ["e2"]}]
        })
        .to_string(),
    );
    corpus.write("pred", "out_0.json", "{\"entities\": [");

    let report = CorpusEvaluator::default().evaluate(&corpus.layout()).unwrap();

    let doc = &report.documents[0];
    assert_eq!(doc.status, DocumentStatus::PredictionUnreadable);
    assert_eq!(doc.counts.entity, ConfusionCounts::new(0, 0, 2));
    assert_eq!(doc.counts.event, ConfusionCounts::new(0, 0, 1));
}

#[test]
fn test_prediction_without_entities_scores_events_only() {
    let corpus = Corpus::new();
    corpus.add_pair(
        0,
        json!({
            "entities": [entity("e1", "Testator", &["John Smith"])],
            "events": [{"id": "v1", "type": "SignWill", "Testator": ["e1"]}]
        }),
        json!({"entities": [], "events": [{"id": "p1", "type": "SignWill"}]}),
    );

    let report = CorpusEvaluator::default().evaluate(&corpus.layout()).unwrap();

    let doc = &report.documents[0];
    assert_eq!(doc.status, DocumentStatus::NoPredictedEntities);
    assert_eq!(doc.counts.entity, ConfusionCounts::default());
    assert_eq!(doc.counts.event, ConfusionCounts::new(0, 1, 1));
}

#[test]
fn test_one_bad_document_does_not_stop_the_run() {
    let corpus = Corpus::new();
    corpus.add_pair(
        0,
        json!({"entities": [entity("e1", "Testator", &["John Smith"])], "events": []}),
        json!({"entities": [{"id": "T1", "type": "Testator", "text": "John Smith"}], "events": []}),
    );
    let good = json!({"entities": [entity("e1", "Testator", &["John Smith"])], "events": []});
    corpus.add_pair(1, good.clone(), good);

    let report = CorpusEvaluator::default().evaluate(&corpus.layout()).unwrap();

    assert_eq!(report.documents[0].status, DocumentStatus::FormatIssue);
    assert_eq!(report.documents[1].status, DocumentStatus::Scored);
    assert_eq!(report.totals.counts.entity, ConfusionCounts::new(1, 1, 1));
    assert_eq!(report.degraded_count(), 1);
}

// =============================================================================
// Scoring Modes and Reports
// =============================================================================

#[test]
fn test_strict_mode_changes_grouped_events_only() {
    let corpus = Corpus::new();
    let entities = json!([
        entity("e1", "Asset", &["my house"]),
        entity("e2", "Asset", &["my car"]),
        entity("e3", "Beneficiary", &["Mary"])
    ]);
    let events = json!([
        {"id": "v1", "type": "Bequest", "Asset": ["e1"], "Beneficiary": ["e3"]},
        {"id": "v2", "type": "Bequest", "Asset": ["e2"], "Beneficiary": ["e3"]}
    ]);
    let document = json!({"entities": entities, "events": events});
    corpus.add_pair(0, document.clone(), document);

    let legacy = CorpusEvaluator::default().evaluate(&corpus.layout()).unwrap();
    let strict = CorpusEvaluator::new(ScoringConfig::default().with_mode(ScoringMode::Strict))
        .evaluate(&corpus.layout())
        .unwrap();

    assert_eq!(legacy.totals.counts.event, ConfusionCounts::new(2, 2, 2));
    assert_eq!(strict.totals.counts.event, ConfusionCounts::new(2, 0, 0));
    assert_eq!(legacy.totals.counts.entity, strict.totals.counts.entity);
}

#[test]
fn test_csv_report_written_to_output_dir() {
    let corpus = Corpus::new();
    let document = json!({"entities": [entity("e1", "Testator", &["John Smith"])], "events": []});
    corpus.add_pair(0, document.clone(), document.clone());
    corpus.add_pair(1, document.clone(), document);

    let report = CorpusEvaluator::default().evaluate(&corpus.layout()).unwrap();
    let output_dir = corpus.output_dir().join("out");
    let path = report.write_csv(&output_dir).unwrap();

    assert_eq!(path, output_dir.join(REPORT_FILE_NAME));
    let content = fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert!(lines[0].starts_with("Gold,Prediction,Entity_TP"));
    assert!(lines[1].contains("will_0.json"));
    assert!(lines[2].contains("out_1.json"));
    assert_eq!(lines[3], ",,2,0,0,0,0,0,1.0,1.0,1.0,0.0,0.0,0.0");
}
