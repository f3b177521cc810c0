//! Review command - submit edited results from a JSON file.

use super::get_orchestrator;
use crate::commands::upload::print_summary;
use anyhow::{Context, Result};
use bomflow_core::{MatchResult, MatchSummary};
use colored::Colorize;
use serde::Deserialize;
use std::path::Path;

/// Accepted review file shapes: either a bare result array, or the
/// object exported by `bomflow results --json`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ReviewPayload {
    Wrapped {
        results: Vec<MatchResult>,
        #[serde(default)]
        summary: Option<MatchSummary>,
    },
    Bare(Vec<MatchResult>),
}

pub fn run(id: &str, file: &Path) -> Result<()> {
    let orch = get_orchestrator()?;

    let contents = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let payload: ReviewPayload = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid review file: {}", file.display()))?;

    let (results, summary) = match payload {
        ReviewPayload::Wrapped { results, summary } => (results, summary),
        ReviewPayload::Bare(results) => (results, None),
    };

    let summary = orch.update_results(id, results, summary)?;

    println!("{} Review applied, workflow completed.", "✓".green());
    print_summary(&summary);
    Ok(())
}
