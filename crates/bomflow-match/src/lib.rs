//! Bomflow Match - Scoring extracted candidates against item catalogs.
//!
//! The matcher is pure: it takes in-memory views of the knowledge base
//! and (optionally) an item master, and returns scored match results.
//! Persistence belongs to the workflow orchestrator.

mod catalog;
mod matcher;
mod normalize;
mod score;

pub use catalog::CatalogEntry;
pub use matcher::{match_candidates, MatchConfig};
pub use normalize::{normalize_identifier, tokenize};
pub use score::fuzzy_score;
