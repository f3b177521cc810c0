//! Candidate matching against catalog views.

use crate::catalog::CatalogEntry;
use crate::normalize::normalize_identifier;
use crate::score::{weighted_score, ScoreWeights};
use bomflow_core::{CandidateItem, MatchClass, MatchResult};
use tracing::debug;

/// Tunables for the matching pass.
#[derive(Debug, Clone, Copy)]
pub struct MatchConfig {
    /// Minimum blended score for a fuzzy match.
    pub fuzzy_threshold: f64,
    pub identifier_weight: f64,
    pub description_weight: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: 0.75,
            identifier_weight: 0.4,
            description_weight: 0.6,
        }
    }
}

struct Scored<'a> {
    entry: &'a CatalogEntry,
    score: f64,
    exact: bool,
}

/// Match extracted candidates against the knowledge base and, when present,
/// an item master view.
///
/// When `item_master_view` is given (full mode), the item master is
/// authoritative: the knowledge base is only consulted for candidates the
/// master could not place. Results come back in candidate order, one per
/// candidate.
pub fn match_candidates(
    workflow_id: &str,
    candidates: Vec<CandidateItem>,
    kb_view: &[CatalogEntry],
    item_master_view: Option<&[CatalogEntry]>,
    config: &MatchConfig,
) -> Vec<MatchResult> {
    candidates
        .into_iter()
        .map(|candidate| {
            let result = match_one(workflow_id, candidate, kb_view, item_master_view, config);
            debug!(
                "Matched {} as {} ({:.3})",
                result.candidate.identifier, result.classification, result.confidence
            );
            result
        })
        .collect()
}

fn match_one(
    workflow_id: &str,
    candidate: CandidateItem,
    kb_view: &[CatalogEntry],
    item_master_view: Option<&[CatalogEntry]>,
    config: &MatchConfig,
) -> MatchResult {
    if let Some(master) = item_master_view {
        if let Some(best) = best_in_view(&candidate, master, config) {
            if let Some(result) = classify(workflow_id, &candidate, &best, config) {
                return result;
            }
            // Master had no acceptable match; fall through to the knowledge
            // base but keep the master's score as a floor.
            let master_score = best.score;
            if let Some(kb_best) = best_in_view(&candidate, kb_view, config) {
                if let Some(result) = classify(workflow_id, &candidate, &kb_best, config) {
                    return result;
                }
                let retained = master_score.max(kb_best.score);
                return MatchResult::new(workflow_id, candidate).with_best_score(retained);
            }
            return MatchResult::new(workflow_id, candidate).with_best_score(master_score);
        }
    }

    match best_in_view(&candidate, kb_view, config) {
        Some(best) => classify(workflow_id, &candidate, &best, config)
            .unwrap_or_else(|| MatchResult::new(workflow_id, candidate).with_best_score(best.score)),
        None => MatchResult::new(workflow_id, candidate),
    }
}

/// Score every entry of a view and keep the best one.
///
/// Ties are broken by most recent approval timestamp, then by lowest
/// identifier, so repeated runs over the same catalog pick the same entry.
fn best_in_view<'a>(
    candidate: &CandidateItem,
    view: &'a [CatalogEntry],
    config: &MatchConfig,
) -> Option<Scored<'a>> {
    let candidate_norm = normalize_identifier(&candidate.identifier);
    let weights = ScoreWeights {
        identifier: config.identifier_weight,
        description: config.description_weight,
    };

    let mut best: Option<Scored<'a>> = None;
    for entry in view {
        let exact =
            !candidate_norm.is_empty() && normalize_identifier(&entry.identifier) == candidate_norm;
        let score = if exact {
            1.0
        } else {
            weighted_score(
                &candidate.identifier,
                &candidate.description,
                &entry.identifier,
                &entry.description,
                weights,
            )
        };
        let scored = Scored {
            entry,
            score,
            exact,
        };
        best = match best {
            None => Some(scored),
            Some(current) if prefer(&scored, &current) => Some(scored),
            Some(current) => Some(current),
        };
    }
    best
}

/// Whether `a` beats `b`: higher score, then more recent approval, then
/// lower identifier.
fn prefer(a: &Scored<'_>, b: &Scored<'_>) -> bool {
    if a.score != b.score {
        return a.score > b.score;
    }
    if a.entry.decided_at != b.entry.decided_at {
        return a.entry.decided_at > b.entry.decided_at;
    }
    a.entry.identifier < b.entry.identifier
}

/// Turn the best-scoring entry into a result, or `None` when it falls below
/// the fuzzy threshold.
fn classify(
    workflow_id: &str,
    candidate: &CandidateItem,
    best: &Scored<'_>,
    config: &MatchConfig,
) -> Option<MatchResult> {
    let class = if best.exact {
        MatchClass::Exact
    } else if best.score >= config.fuzzy_threshold {
        MatchClass::Fuzzy
    } else {
        return None;
    };
    Some(
        MatchResult::new(workflow_id, candidate.clone()).with_match(
            best.entry.as_matched_ref(),
            best.score,
            class,
        ),
    )
}
