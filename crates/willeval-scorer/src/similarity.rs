//! Similarity metrics for entity and event records
//!
//! Entities are compared by type agreement plus the mean character ratio of
//! their mentions. Events are compared on the entity identifiers filling
//! their argument roles, with two different formulas: a symmetric set
//! overlap used when several events of one type must be aligned, and an
//! asymmetric gold-weighted score used when exactly one event of a type
//! exists on each side.

use std::collections::{BTreeSet, HashSet};

use willeval_core::config::{DEFAULT_ENTITY_TEXT_WEIGHT, DEFAULT_ENTITY_TYPE_WEIGHT};
use willeval_core::{Entity, Event};

use crate::sequence::ratio;

/// Weights of the two terms of entity similarity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EntityWeights {
    pub type_weight: f64,
    pub text_weight: f64,
}

impl Default for EntityWeights {
    fn default() -> Self {
        Self {
            type_weight: DEFAULT_ENTITY_TYPE_WEIGHT,
            text_weight: DEFAULT_ENTITY_TEXT_WEIGHT,
        }
    }
}

/// Entity similarity with the default 0.7 type / 0.3 text weighting
pub fn entity_similarity(a: &Entity, b: &Entity) -> f64 {
    weighted_entity_similarity(a, b, EntityWeights::default())
}

/// `type_weight * [a.type == b.type] + text_weight * text_similarity`
pub fn weighted_entity_similarity(a: &Entity, b: &Entity, weights: EntityWeights) -> f64 {
    let type_match = if a.entity_type == b.entity_type { 1.0 } else { 0.0 };
    weights.type_weight * type_match + weights.text_weight * text_similarity(&a.texts, &b.texts)
}

/// Mean character ratio over every (a, b) mention pair, capped at 1.0.
///
/// Returns 0.0 when either side has no mentions.
pub fn text_similarity(a: &[String], b: &[String]) -> f64 {
    let pairs = a.len() * b.len();
    if pairs == 0 {
        return 0.0;
    }

    let total: f64 = a
        .iter()
        .flat_map(|left| b.iter().map(move |right| ratio(left, right)))
        .sum();

    (total / pairs as f64).min(1.0)
}

/// Set-overlap similarity of two events' arguments.
///
/// For every role in either event: a role present on one side only makes all
/// of its identifiers dissimilar; a shared role contributes its identifier
/// intersection as similar and the symmetric difference as dissimilar.
/// Events with no arguments at all score 0.0.
pub fn event_similarity(a: &Event, b: &Event) -> f64 {
    let roles: BTreeSet<&str> = a
        .arguments
        .keys()
        .chain(b.arguments.keys())
        .map(String::as_str)
        .collect();

    let mut similar = 0usize;
    let mut dissimilar = 0usize;

    for role in roles {
        match (a.role(role), b.role(role)) {
            (Some(left), Some(right)) => {
                let left: HashSet<&str> = left.ids().iter().map(String::as_str).collect();
                let right: HashSet<&str> = right.ids().iter().map(String::as_str).collect();
                similar += left.intersection(&right).count();
                dissimilar += left.symmetric_difference(&right).count();
            }
            (Some(only), None) | (None, Some(only)) => dissimilar += only.len(),
            (None, None) => {}
        }
    }

    fraction(similar, dissimilar)
}

/// Gold-weighted similarity for a type with exactly one event per side.
///
/// Each gold identifier found in the same prediction role scores 2, each gold
/// identifier missing from it costs 1, and each identifier of a role the gold
/// event does not have costs 1. Prediction identifiers that are extra within a
/// shared role are not penalised, so the score is not symmetric.
pub fn one_to_one_similarity(gold: &Event, prediction: &Event) -> f64 {
    let mut similarity = 0usize;
    let mut dissimilarity = 0usize;

    for (role, gold_ids) in &gold.arguments {
        match prediction.role(role) {
            Some(predicted_ids) => {
                for id in gold_ids.ids() {
                    if predicted_ids.contains(id) {
                        similarity += 2;
                    } else {
                        dissimilarity += 1;
                    }
                }
            }
            None => dissimilarity += gold_ids.len(),
        }
    }

    for (role, predicted_ids) in &prediction.arguments {
        if gold.role(role).is_none() {
            dissimilarity += predicted_ids.len();
        }
    }

    fraction(similarity, dissimilarity)
}

fn fraction(hits: usize, misses: usize) -> f64 {
    if hits + misses == 0 {
        0.0
    } else {
        hits as f64 / (hits + misses) as f64
    }
}
