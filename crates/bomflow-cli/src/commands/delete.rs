//! Delete command - remove a workflow and its documents.

use super::{get_orchestrator, short_id};
use anyhow::Result;
use colored::Colorize;

pub fn run(id: &str) -> Result<()> {
    let orch = get_orchestrator()?;
    orch.delete_workflow(id)?;
    println!("{} Deleted workflow {}", "✓".green(), short_id(id).cyan());
    Ok(())
}
