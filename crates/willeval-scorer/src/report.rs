//! Corpus report output
//!
//! The CSV layout is consumed by existing spreadsheets: one row per
//! document pair in index order, then a summary row with empty file columns
//! holding the summed counts and the metrics recomputed from those sums.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::Serialize;
use willeval_core::{EvalError, Result, ScoringConfig};

use crate::corpus::{DocumentResult, DocumentStatus};
use crate::metrics::{AggregateMetrics, DocumentCounts, Metrics};

/// Name of the CSV report written into the output directory
pub const REPORT_FILE_NAME: &str = "evaluation_result.csv";

/// Name of the optional JSON report written next to the CSV
pub const JSON_REPORT_FILE_NAME: &str = "evaluation_result.json";

const CSV_HEADER: [&str; 14] = [
    "Gold",
    "Prediction",
    "Entity_TP",
    "Entity_FP",
    "Entity_FN",
    "Event_TP",
    "Event_FP",
    "Event_FN",
    "Entity_Precision",
    "Entity_Recall",
    "Entity_F1",
    "Event_Precision",
    "Event_Recall",
    "Event_F1",
];

/// Per-document results of a corpus run plus their totals
#[derive(Debug, Clone, Serialize)]
pub struct CorpusReport {
    pub generated_at: DateTime<Utc>,
    pub scoring: ScoringConfig,
    pub documents: Vec<DocumentResult>,
    pub totals: AggregateMetrics,
}

/// JSON view of one document row with its derived metrics
#[derive(Serialize)]
struct DocumentEntry<'a> {
    gold: &'a Path,
    prediction: &'a Path,
    status: DocumentStatus,
    counts: &'a DocumentCounts,
    entity_metrics: Metrics,
    event_metrics: Metrics,
}

#[derive(Serialize)]
struct TotalsEntry<'a> {
    num_documents: usize,
    counts: &'a DocumentCounts,
    entity_metrics: Metrics,
    event_metrics: Metrics,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    generated_at: &'a DateTime<Utc>,
    scoring: &'a ScoringConfig,
    documents: Vec<DocumentEntry<'a>>,
    totals: TotalsEntry<'a>,
}

impl CorpusReport {
    pub fn new(documents: Vec<DocumentResult>, totals: AggregateMetrics, scoring: ScoringConfig) -> Self {
        Self {
            generated_at: Utc::now(),
            scoring,
            documents,
            totals,
        }
    }

    /// Number of documents that could not be fully compared
    pub fn degraded_count(&self) -> usize {
        self.documents
            .iter()
            .filter(|doc| doc.status != DocumentStatus::Scored)
            .count()
    }

    /// Render the CSV report
    pub fn to_csv(&self) -> String {
        let mut out = String::new();
        out.push_str(&CSV_HEADER.join(","));
        out.push('\n');

        for doc in &self.documents {
            push_row(
                &mut out,
                &doc.gold_path.display().to_string(),
                &doc.prediction_path.display().to_string(),
                &doc.counts,
            );
        }
        push_row(&mut out, "", "", &self.totals.counts);

        out
    }

    /// Write the CSV report to `<output_dir>/evaluation_result.csv`
    pub fn write_csv(&self, output_dir: &Path) -> Result<PathBuf> {
        let path = output_dir.join(REPORT_FILE_NAME);
        write_file(&path, self.to_csv())?;
        Ok(path)
    }

    /// Render the JSON report
    pub fn to_json(&self) -> Result<String> {
        let report = JsonReport {
            generated_at: &self.generated_at,
            scoring: &self.scoring,
            documents: self
                .documents
                .iter()
                .map(|doc| DocumentEntry {
                    gold: &doc.gold_path,
                    prediction: &doc.prediction_path,
                    status: doc.status,
                    counts: &doc.counts,
                    entity_metrics: doc.entity_metrics(),
                    event_metrics: doc.event_metrics(),
                })
                .collect(),
            totals: TotalsEntry {
                num_documents: self.totals.num_documents,
                counts: &self.totals.counts,
                entity_metrics: self.totals.entity_metrics(),
                event_metrics: self.totals.event_metrics(),
            },
        };

        serde_json::to_string_pretty(&report).map_err(|e| EvalError::Other(e.into()))
    }

    /// Write the JSON report to `<output_dir>/evaluation_result.json`
    pub fn write_json(&self, output_dir: &Path) -> Result<PathBuf> {
        let path = output_dir.join(JSON_REPORT_FILE_NAME);
        write_file(&path, self.to_json()?)?;
        Ok(path)
    }

    /// Human-readable totals
    pub fn summary(&self) -> String {
        let mut text = self.totals.report();
        let degraded = self.degraded_count();
        if degraded > 0 {
            let _ = writeln!(text, "\nDocuments not fully scored: {degraded}");
            for doc in self.documents.iter().filter(|d| d.status != DocumentStatus::Scored) {
                let _ = writeln!(text, "  {} ({})", doc.prediction_path.display(), doc.status);
            }
        }
        text
    }
}

fn write_file(path: &Path, content: String) -> Result<()> {
    fs::write(path, content).map_err(|source| EvalError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn push_row(out: &mut String, gold: &str, prediction: &str, counts: &DocumentCounts) {
    let entity = counts.entity.metrics();
    let event = counts.event.metrics();

    let fields = [
        escape_field(gold),
        escape_field(prediction),
        counts.entity.true_positives.to_string(),
        counts.entity.false_positives.to_string(),
        counts.entity.false_negatives.to_string(),
        counts.event.true_positives.to_string(),
        counts.event.false_positives.to_string(),
        counts.event.false_negatives.to_string(),
        format_metric(entity.precision),
        format_metric(entity.recall),
        format_metric(entity.f1),
        format_metric(event.precision),
        format_metric(event.recall),
        format_metric(event.f1),
    ];

    out.push_str(&fields.join(","));
    out.push('\n');
}

/// Shortest round-trip decimal, always with a fractional part (`0.0`, `1.0`)
fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::ConfusionCounts;
    use tempfile::TempDir;

    fn row(gold: &str, prediction: &str, counts: DocumentCounts, status: DocumentStatus) -> DocumentResult {
        DocumentResult {
            gold_path: PathBuf::from(gold),
            prediction_path: PathBuf::from(prediction),
            status,
            counts,
        }
    }

    fn sample_report() -> CorpusReport {
        let first = DocumentCounts {
            entity: ConfusionCounts::new(2, 0, 0),
            event: ConfusionCounts::new(1, 0, 0),
        };
        let second = DocumentCounts {
            entity: ConfusionCounts::new(0, 1, 1),
            event: ConfusionCounts::new(0, 0, 1),
        };
        let mut totals = AggregateMetrics::default();
        totals.add_document(&first);
        totals.add_document(&second);

        CorpusReport::new(
            vec![
                row("gold/will_0.json", "pred/out_0.json", first, DocumentStatus::Scored),
                row("gold/will_1.json", "pred/out_1.json", second, DocumentStatus::FormatIssue),
            ],
            totals,
            ScoringConfig::default(),
        )
    }

    #[test]
    fn test_csv_layout() {
        let csv = sample_report().to_csv();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(
            lines[0],
            "Gold,Prediction,Entity_TP,Entity_FP,Entity_FN,Event_TP,Event_FP,Event_FN,\
             Entity_Precision,Entity_Recall,Entity_F1,Event_Precision,Event_Recall,Event_F1"
        );
        assert_eq!(
            lines[1],
            "gold/will_0.json,pred/out_0.json,2,0,0,1,0,0,1.0,1.0,1.0,1.0,1.0,1.0"
        );
        assert_eq!(
            lines[2],
            "gold/will_1.json,pred/out_1.json,0,1,1,0,0,1,0.0,0.0,0.0,0.0,0.0,0.0"
        );
        assert!(lines[3].starts_with(",,2,1,1,1,0,1,"));
    }

    #[test]
    fn test_summary_row_recomputes_metrics_from_sums() {
        let csv = sample_report().to_csv();
        let summary = csv.lines().last().unwrap_or_default();
        let fields: Vec<&str> = summary.split(',').collect();

        let entity_precision: f64 = fields[8].parse().unwrap();
        assert!((entity_precision - 2.0 / 3.0).abs() < 1e-12);
        let event_recall: f64 = fields[12].parse().unwrap();
        assert!((event_recall - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_format_metric() {
        assert_eq!(format_metric(0.0), "0.0");
        assert_eq!(format_metric(1.0), "1.0");
        assert_eq!(format_metric(0.5), "0.5");
        assert_eq!(format_metric(2.0 / 3.0), "0.6666666666666666");
    }

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain.json"), "plain.json");
        assert_eq!(escape_field("a,b.json"), "\"a,b.json\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_write_csv_and_json() {
        let dir = TempDir::new().unwrap();
        let report = sample_report();

        let csv_path = report.write_csv(dir.path()).unwrap();
        assert_eq!(csv_path.file_name().unwrap(), REPORT_FILE_NAME);
        assert_eq!(fs::read_to_string(&csv_path).unwrap(), report.to_csv());

        let json_path = report.write_json(dir.path()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(json_path).unwrap()).unwrap();
        assert_eq!(value["totals"]["num_documents"], 2);
        assert_eq!(value["documents"][1]["status"], "format_issue");
        assert_eq!(value["scoring"]["mode"], "legacy");
        assert!(value["generated_at"].is_string());
    }

    #[test]
    fn test_summary_lists_degraded_documents() {
        let summary = sample_report().summary();
        assert!(summary.contains("Documents evaluated: 2"));
        assert!(summary.contains("Documents not fully scored: 1"));
        assert!(summary.contains("pred/out_1.json (format_issue)"));
    }
}
