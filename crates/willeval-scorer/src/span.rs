//! Greedy alignment of raw mention strings
//!
//! Used inside one already-matched entity pair to decide which gold mention
//! each predicted mention corresponds to.

use serde::Serialize;

use crate::sequence::ratio;

/// One aligned pair of mention strings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpanMatch<'a> {
    pub gold_index: usize,
    pub prediction_index: usize,
    pub gold: &'a str,
    pub prediction: &'a str,
    pub score: f64,
}

/// Greedily pair mentions, best pair first.
///
/// Each round scans every unused `(gold, prediction)` index combination in
/// order and keeps the first pair with the strictly highest ratio; both indices
/// are then retired. At most `min(gold.len(), prediction.len())` pairs are
/// produced, and pairs with a ratio of zero are never selected. No threshold
/// is applied here.
pub fn match_spans<'a>(gold: &'a [String], prediction: &'a [String]) -> Vec<SpanMatch<'a>> {
    let rounds = gold.len().min(prediction.len());
    let mut gold_used = vec![false; gold.len()];
    let mut prediction_used = vec![false; prediction.len()];
    let mut matches = Vec::with_capacity(rounds);

    for _ in 0..rounds {
        let mut best: Option<(usize, usize, f64)> = None;

        for (i, gold_text) in gold.iter().enumerate() {
            if gold_used[i] {
                continue;
            }
            for (j, predicted_text) in prediction.iter().enumerate() {
                if prediction_used[j] {
                    continue;
                }
                let score = ratio(gold_text, predicted_text);
                let best_score = best.map_or(0.0, |(_, _, s)| s);
                if score > best_score {
                    best = Some((i, j, score));
                }
            }
        }

        // Every remaining pair scores zero; later rounds cannot do better
        let Some((i, j, score)) = best else {
            break;
        };

        gold_used[i] = true;
        prediction_used[j] = true;
        matches.push(SpanMatch {
            gold_index: i,
            prediction_index: j,
            gold: &gold[i],
            prediction: &prediction[j],
            score,
        });
    }

    matches
}
