//! Status command - show one workflow's state.

use super::{get_config, get_orchestrator, status_badge};
use crate::commands::upload::print_summary;
use anyhow::Result;
use colored::Colorize;

pub fn run(id: &str) -> Result<()> {
    let orch = get_orchestrator()?;
    let config = get_config()?;

    let workflow = orch.status(id)?;

    println!("{}", workflow.name.cyan().bold());
    println!("  ID:       {}", workflow.id);
    println!("  Status:   {}", status_badge(workflow.status));
    println!("  Mode:     {}", workflow.mode);
    println!("  Document: {}", workflow.document_path);
    if let Some(master) = &workflow.item_master_path {
        println!("  Item master: {}", master);
    }
    println!(
        "  Created:  {}",
        workflow.created_at.format(&config.ui.date_format)
    );
    println!(
        "  Updated:  {}",
        workflow.updated_at.format(&config.ui.date_format)
    );

    if let Some(error) = &workflow.error {
        println!("  {} {}", "Failure:".red().bold(), error);
    }
    if let Some(summary) = &workflow.summary {
        print_summary(summary);
    }

    Ok(())
}
