//! Results command - show a workflow's match results.

use super::get_orchestrator;
use crate::commands::upload::print_summary;
use anyhow::{Context, Result};
use bomflow_core::MatchClass;
use colored::Colorize;

pub fn run(id: &str, json: bool) -> Result<()> {
    let orch = get_orchestrator()?;
    let (workflow, results) = orch.results(id)?;

    if json {
        let payload = serde_json::json!({
            "workflow": workflow,
            "summary": workflow.summary,
            "results": results,
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&payload).context("Failed to render results")?
        );
        return Ok(());
    }

    println!("{}", workflow.name.cyan().bold());
    println!();

    for result in &results {
        let (marker, class) = match result.classification {
            MatchClass::Exact => ("●".green(), "exact".green()),
            MatchClass::Fuzzy => ("◐".yellow(), "fuzzy".yellow()),
            MatchClass::Unmatched => ("○".red(), "unmatched".red()),
        };

        let edited = if result.edited {
            " (edited)".dimmed().to_string()
        } else {
            String::new()
        };

        println!(
            "  {} {} — {} [{} {:.2}]{}",
            marker, result.candidate.identifier, result.candidate.description, class,
            result.confidence, edited
        );
        if let Some(matched) = &result.matched {
            println!(
                "      {} {} — {} ({})",
                "→".dimmed(),
                matched.identifier,
                matched.description,
                matched.source.as_str().dimmed()
            );
        }
    }

    if let Some(summary) = &workflow.summary {
        print_summary(summary);
    }

    println!();
    println!(
        "Export for review with: {}",
        format!("bomflow results {} --json > review.json", id).cyan()
    );

    Ok(())
}
