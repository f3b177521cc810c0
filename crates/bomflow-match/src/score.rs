//! Blended similarity scoring.

use crate::normalize::{normalize_identifier, tokenize};

/// Weights applied when blending identifier and description similarity.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ScoreWeights {
    pub identifier: f64,
    pub description: f64,
}

/// Jaccard similarity over two sorted, deduplicated token sets.
fn jaccard(a: &[String], b: &[String]) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 0.0;
    }
    let mut intersection = 0usize;
    let (mut i, mut j) = (0usize, 0usize);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Equal => {
                intersection += 1;
                i += 1;
                j += 1;
            }
            std::cmp::Ordering::Less => i += 1,
            std::cmp::Ordering::Greater => j += 1,
        }
    }
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Blended fuzzy similarity between a candidate and a catalog entry.
///
/// Identifier similarity is Jaro-Winkler over normalized identifiers;
/// description similarity is Jaccard over token sets. The two are combined
/// with the configured weights into a score in `[0.0, 1.0]`.
pub fn fuzzy_score(
    candidate_identifier: &str,
    candidate_description: &str,
    entry_identifier: &str,
    entry_description: &str,
) -> f64 {
    weighted_score(
        candidate_identifier,
        candidate_description,
        entry_identifier,
        entry_description,
        ScoreWeights {
            identifier: 0.4,
            description: 0.6,
        },
    )
}

pub(crate) fn weighted_score(
    candidate_identifier: &str,
    candidate_description: &str,
    entry_identifier: &str,
    entry_description: &str,
    weights: ScoreWeights,
) -> f64 {
    let id_sim = strsim::jaro_winkler(
        &normalize_identifier(candidate_identifier),
        &normalize_identifier(entry_identifier),
    );
    let desc_sim = jaccard(
        &tokenize(candidate_description),
        &tokenize(entry_description),
    );
    weights.identifier * id_sim + weights.description * desc_sim
}
