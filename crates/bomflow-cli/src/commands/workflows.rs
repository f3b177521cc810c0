//! Workflows command - list all workflows.

use super::{get_config, get_orchestrator, short_id, status_badge};
use anyhow::Result;
use colored::Colorize;

pub fn run() -> Result<()> {
    let orch = get_orchestrator()?;
    let config = get_config()?;

    let workflows = orch.list()?;
    if workflows.is_empty() {
        println!(
            "{}",
            "No workflows yet. Use 'bomflow upload <document>' to start one.".dimmed()
        );
        return Ok(());
    }

    println!("{}", "Workflows".cyan().bold());
    for workflow in &workflows {
        println!(
            "  {} {:<16} {} ({}, {})",
            short_id(&workflow.id).cyan(),
            status_badge(workflow.status),
            workflow.name,
            workflow.mode,
            workflow.created_at.format(&config.ui.date_format)
        );
    }
    println!();
    println!("{} workflow(s)", workflows.len());

    Ok(())
}
