//! Upload command - submit one document for processing.

use super::{get_orchestrator, short_id, status_badge};
use anyhow::{Context, Result};
use bomflow_core::{ComparisonMode, MatchSummary, Workflow, WorkflowStatus};
use bomflow_workflow::{Orchestrator, StartWorkflow};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::runtime::Runtime;

pub fn run(
    document: &Path,
    name: Option<String>,
    mode: &str,
    item_master: Option<PathBuf>,
    wait: bool,
) -> Result<()> {
    let orch = get_orchestrator()?;

    let mode = ComparisonMode::from_str(mode)
        .with_context(|| format!("unknown mode '{}' (expected kb_only or full)", mode))?;
    let name = name.unwrap_or_else(|| {
        document
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "workflow".to_string())
    });

    let rt = Runtime::new().context("Failed to create async runtime")?;
    let workflow = rt.block_on(orch.start_workflow(StartWorkflow {
        name,
        mode,
        document: document.to_path_buf(),
        item_master,
    }))?;

    println!(
        "{} Submitted workflow {} ({})",
        "✓".green(),
        short_id(&workflow.id).cyan(),
        workflow.name
    );

    // The pipeline runs on this process's blocking pool, so hold the
    // runtime until it lands.
    let finished = wait_for_pipeline(&orch, &workflow.id, wait)?;

    match finished.status {
        WorkflowStatus::Failed => {
            anyhow::bail!(
                "workflow failed: {}",
                finished.error.as_deref().unwrap_or("unknown failure")
            );
        }
        status if wait => {
            println!("Status: {}", status_badge(status));
            if let Some(summary) = &finished.summary {
                print_summary(summary);
            }
            println!();
            println!(
                "Review with: {}",
                format!("bomflow results {}", short_id(&finished.id)).cyan()
            );
        }
        status => {
            println!("Status: {}", status_badge(status));
        }
    }

    Ok(())
}

/// Block until a workflow's pipeline reaches review or fails.
pub fn wait_for_pipeline(orch: &Orchestrator, id: &str, spinner: bool) -> Result<Workflow> {
    let pb = if spinner {
        let pb = ProgressBar::new_spinner();
        pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
        pb.enable_steady_tick(Duration::from_millis(80));
        Some(pb)
    } else {
        None
    };

    loop {
        let workflow = orch.status(id)?;
        if workflow.status.is_reviewable() || workflow.status == WorkflowStatus::Failed {
            if let Some(pb) = &pb {
                pb.finish_and_clear();
            }
            return Ok(workflow);
        }
        if let Some(pb) = &pb {
            pb.set_message(format!("{}...", workflow.status));
        }
        std::thread::sleep(Duration::from_millis(100));
    }
}

pub fn print_summary(summary: &MatchSummary) {
    println!();
    println!("{}", "Match Summary".white().bold());
    println!("  Total:     {}", summary.total);
    println!("  {} Exact:     {}", "●".green(), summary.exact);
    println!("  {} Fuzzy:     {}", "◐".yellow(), summary.fuzzy);
    println!("  {} Unmatched: {}", "○".red(), summary.unmatched);
    println!("  Avg confidence: {:.2}", summary.avg_confidence);
}
