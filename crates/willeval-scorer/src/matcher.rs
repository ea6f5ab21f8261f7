//! Greedy bipartite alignment of entity and event records
//!
//! The two sides come from independent annotators, so neither order nor
//! identifiers line up. Each round scans the full cross product of records
//! still unpaired and takes the single best-scoring pair. This is a greedy
//! approximation, not an optimal assignment: the first maximum encountered
//! in gold-major scan order wins ties, and that order is kept stable so
//! scores stay comparable with earlier runs.

use std::collections::HashMap;

use tracing::debug;
use willeval_core::{Entity, Event};

/// Prediction-side identifier -> gold-side identifier
pub type IdMap = HashMap<String, String>;

/// A record that can take part in an alignment
pub trait Record {
    fn record_id(&self) -> &str;
}

impl Record for Entity {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for Event {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl<T: Record + ?Sized> Record for &T {
    fn record_id(&self) -> &str {
        (**self).record_id()
    }
}

/// One aligned gold/prediction pair
#[derive(Debug, Clone, PartialEq)]
pub struct MatchPair<'a, T> {
    pub gold_index: usize,
    pub prediction_index: usize,
    pub gold: &'a T,
    pub prediction: &'a T,
    pub score: f64,
}

/// Result of aligning two record lists
#[derive(Debug, Clone, PartialEq)]
pub struct Alignment<'a, T> {
    /// Pairs in the order they were selected
    pub pairs: Vec<MatchPair<'a, T>>,
    /// Indices of gold records left without a partner
    pub unmatched_gold: Vec<usize>,
    /// Indices of prediction records left without a partner
    pub unmatched_prediction: Vec<usize>,
}

impl<T: Record> Alignment<'_, T> {
    /// Map each matched prediction identifier to its gold identifier
    pub fn id_map(&self) -> IdMap {
        self.pairs
            .iter()
            .map(|pair| {
                (
                    pair.prediction.record_id().to_string(),
                    pair.gold.record_id().to_string(),
                )
            })
            .collect()
    }
}

/// Align `gold` against `prediction` under `similarity`.
///
/// Rounds continue until one side is exhausted, so exactly
/// `min(gold.len(), prediction.len())` pairs are returned. When no remaining
/// pair scores above zero, the first remaining record of each side is paired
/// with a score of 0.0.
pub fn align_records<'a, T, F>(gold: &'a [T], prediction: &'a [T], similarity: F) -> Alignment<'a, T>
where
    T: Record,
    F: Fn(&T, &T) -> f64,
{
    let mut gold_left: Vec<usize> = (0..gold.len()).collect();
    let mut prediction_left: Vec<usize> = (0..prediction.len()).collect();
    let mut pairs = Vec::with_capacity(gold.len().min(prediction.len()));

    while !gold_left.is_empty() && !prediction_left.is_empty() {
        // (position in gold_left, position in prediction_left, score)
        let mut best: Option<(usize, usize, f64)> = None;

        for (gold_pos, &g) in gold_left.iter().enumerate() {
            for (prediction_pos, &p) in prediction_left.iter().enumerate() {
                let score = similarity(&gold[g], &prediction[p]);
                if score > best.map_or(0.0, |(_, _, s)| s) {
                    best = Some((gold_pos, prediction_pos, score));
                }
            }
        }

        let (gold_pos, prediction_pos, score) = best.unwrap_or_else(|| {
            debug!(
                gold_left = gold_left.len(),
                prediction_left = prediction_left.len(),
                "no positive similarity left, pairing first remaining records"
            );
            (0, 0, 0.0)
        });

        let g = gold_left.remove(gold_pos);
        let p = prediction_left.remove(prediction_pos);
        pairs.push(MatchPair {
            gold_index: g,
            prediction_index: p,
            gold: &gold[g],
            prediction: &prediction[p],
            score,
        });
    }

    Alignment {
        pairs,
        unmatched_gold: gold_left,
        unmatched_prediction: prediction_left,
    }
}
