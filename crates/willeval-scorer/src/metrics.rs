//! Quality Metrics module
//!
//! Confusion counts for entity and event extraction and the precision,
//! recall and F1 scores derived from them, per document and per corpus.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

// ============================================================================
// Confusion Counts
// ============================================================================

/// True/false positive and false negative counts for one record kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    /// Predicted items accepted as matching the gold standard
    pub true_positives: usize,
    /// Predicted items with no acceptable gold counterpart
    pub false_positives: usize,
    /// Gold items the prediction missed
    pub false_negatives: usize,
}

impl ConfusionCounts {
    pub fn new(true_positives: usize, false_positives: usize, false_negatives: usize) -> Self {
        Self {
            true_positives,
            false_positives,
            false_negatives,
        }
    }

    /// Calculate precision (TP / (TP + FP)), 0 when nothing was predicted
    pub fn precision(&self) -> f64 {
        if self.true_positives + self.false_positives == 0 {
            0.0
        } else {
            self.true_positives as f64 / (self.true_positives + self.false_positives) as f64
        }
    }

    /// Calculate recall (TP / (TP + FN)), 0 when there was nothing to find
    pub fn recall(&self) -> f64 {
        if self.true_positives + self.false_negatives == 0 {
            0.0
        } else {
            self.true_positives as f64 / (self.true_positives + self.false_negatives) as f64
        }
    }

    /// Calculate F1 score (2 * P * R / (P + R))
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }

    pub fn metrics(&self) -> Metrics {
        Metrics {
            precision: self.precision(),
            recall: self.recall(),
            f1: self.f1_score(),
        }
    }
}

impl AddAssign for ConfusionCounts {
    fn add_assign(&mut self, other: Self) {
        self.true_positives += other.true_positives;
        self.false_positives += other.false_positives;
        self.false_negatives += other.false_negatives;
    }
}

/// Derived scores for one set of counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

// ============================================================================
// Document and Corpus Counts
// ============================================================================

/// Counts produced by scoring one gold/prediction document pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentCounts {
    pub entity: ConfusionCounts,
    pub event: ConfusionCounts,
}

impl AddAssign for DocumentCounts {
    fn add_assign(&mut self, other: Self) {
        self.entity += other.entity;
        self.event += other.event;
    }
}

/// Aggregate counts for a batch of evaluations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AggregateMetrics {
    pub counts: DocumentCounts,
    pub num_documents: usize,
}

impl AggregateMetrics {
    /// Add one document's counts to the running totals
    pub fn add_document(&mut self, counts: &DocumentCounts) {
        self.counts += *counts;
        self.num_documents += 1;
    }

    pub fn entity_metrics(&self) -> Metrics {
        self.counts.entity.metrics()
    }

    pub fn event_metrics(&self) -> Metrics {
        self.counts.event.metrics()
    }

    /// Print a summary report
    pub fn report(&self) -> String {
        let entity = &self.counts.entity;
        let event = &self.counts.event;
        format!(
            "=== Will Extraction Evaluation Report ===\n\n\
             Documents evaluated: {}\n\n\
             Entities:\n\
               Precision: {:.1}%\n\
               Recall:    {:.1}%\n\
               F1 Score:  {:.1}%\n\
               TP: {} | FP: {} | FN: {}\n\n\
             Events:\n\
               Precision: {:.1}%\n\
               Recall:    {:.1}%\n\
               F1 Score:  {:.1}%\n\
               TP: {} | FP: {} | FN: {}\n",
            self.num_documents,
            entity.precision() * 100.0,
            entity.recall() * 100.0,
            entity.f1_score() * 100.0,
            entity.true_positives,
            entity.false_positives,
            entity.false_negatives,
            event.precision() * 100.0,
            event.recall() * 100.0,
            event.f1_score() * 100.0,
            event.true_positives,
            event.false_positives,
            event.false_negatives,
        )
    }
}

// ============================================================================
// Tests
// ============================================================================
