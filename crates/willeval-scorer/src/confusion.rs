//! Per-document confusion accounting
//!
//! Turns entity alignments, mention alignments and per-type event
//! comparisons into true/false positive and false negative counts.

use tracing::debug;
use willeval_core::{Document, Entity, Event, ScoringConfig, ScoringMode};

use crate::grouping::{count_by_type, group_by_type, TypeCount};
use crate::matcher::{align_records, IdMap};
use crate::metrics::{ConfusionCounts, DocumentCounts};
use crate::remap::remap_event_arguments;
use crate::similarity::{event_similarity, one_to_one_similarity, weighted_entity_similarity, EntityWeights};
use crate::span::match_spans;

/// Scores gold/prediction document pairs under one scoring configuration
#[derive(Debug, Clone, Default)]
pub struct Scorer {
    config: ScoringConfig,
}

impl Scorer {
    pub fn new(config: ScoringConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    fn entity_weights(&self) -> EntityWeights {
        EntityWeights {
            type_weight: self.config.entity_type_weight,
            text_weight: self.config.entity_text_weight,
        }
    }

    /// Score one document pair.
    ///
    /// Entities are aligned first; the resulting identifier map translates
    /// prediction event arguments into the gold identifier space before
    /// events are compared type by type.
    pub fn score_document(&self, gold: &Document, prediction: &Document) -> DocumentCounts {
        let (entity, id_map) = self.score_entities(&gold.entities, &prediction.entities);

        let mut prediction_events = prediction.events.clone();
        let rewritten = remap_event_arguments(&mut prediction_events, &id_map);
        debug!(rewritten, mapped_entities = id_map.len(), "remapped prediction event arguments");

        let event = self.score_events(&gold.events, &prediction_events);

        DocumentCounts { entity, event }
    }

    /// Count entity mentions and return the prediction -> gold identifier map.
    ///
    /// Every mention pair of a matched entity pair scoring strictly above the
    /// threshold is a true positive. Mentions beyond that on either side are
    /// false positives (prediction) or false negatives (gold).
    pub fn score_entities(&self, gold: &[Entity], prediction: &[Entity]) -> (ConfusionCounts, IdMap) {
        let weights = self.entity_weights();
        let alignment = align_records(gold, prediction, |g, p| weighted_entity_similarity(g, p, weights));

        let mut true_positives = 0;
        for pair in &alignment.pairs {
            for span in match_spans(&pair.gold.texts, &pair.prediction.texts) {
                debug!(
                    gold = span.gold,
                    prediction = span.prediction,
                    score = span.score,
                    "mention pair"
                );
                if span.score > self.config.similarity_threshold {
                    true_positives += 1;
                }
            }
        }

        let gold_mentions: usize = gold.iter().map(|e| e.texts.len()).sum();
        let predicted_mentions: usize = prediction.iter().map(|e| e.texts.len()).sum();

        let counts = ConfusionCounts::new(
            true_positives,
            predicted_mentions.saturating_sub(true_positives),
            gold_mentions.saturating_sub(true_positives),
        );

        (counts, alignment.id_map())
    }

    /// Count events type by type.
    ///
    /// `prediction` must already use gold entity identifiers.
    pub fn score_events(&self, gold: &[Event], prediction: &[Event]) -> ConfusionCounts {
        let gold_groups = group_by_type(gold);
        let prediction_groups = group_by_type(prediction);
        let threshold = self.config.similarity_threshold;

        let mut counts = ConfusionCounts::default();

        for (event_type, TypeCount { gold: n_gold, prediction: n_prediction }) in
            count_by_type(&gold_groups, &prediction_groups)
        {
            if n_gold == 0 {
                counts.false_positives += n_prediction;
                continue;
            }
            if n_prediction == 0 {
                counts.false_negatives += n_gold;
                continue;
            }

            let gold_events = &gold_groups[event_type];
            let prediction_events = &prediction_groups[event_type];

            if n_gold == 1 && n_prediction == 1 {
                let score = one_to_one_similarity(gold_events[0], prediction_events[0]);
                debug!(event_type, score, "one-to-one event comparison");
                if score >= threshold {
                    counts.true_positives += 1;
                } else {
                    counts.false_positives += 1;
                    counts.false_negatives += 1;
                }
                continue;
            }

            let alignment = align_records(gold_events, prediction_events, |g, p| event_similarity(g, p));
            for pair in &alignment.pairs {
                debug!(
                    event_type,
                    gold = %pair.gold.id,
                    prediction = %pair.prediction.id,
                    score = pair.score,
                    "grouped event comparison"
                );
                if pair.score >= threshold {
                    counts.true_positives += 1;
                } else {
                    counts.false_positives += 1;
                    counts.false_negatives += 1;
                }
            }

            match self.config.mode {
                ScoringMode::Legacy => {
                    counts.false_negatives += n_gold;
                    counts.false_positives += n_prediction;
                }
                ScoringMode::Strict => {
                    counts.false_negatives += alignment.unmatched_gold.len();
                    counts.false_positives += alignment.unmatched_prediction.len();
                }
            }
        }

        counts
    }
}
