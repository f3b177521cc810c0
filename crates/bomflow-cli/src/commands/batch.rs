//! Batch command - process every document behind a shared folder.

use super::{get_config, get_orchestrator, short_id, status_badge};
use crate::commands::upload::wait_for_pipeline;
use anyhow::{Context, Result};
use bomflow_workflow::LocalMirrorAdapter;
use colored::Colorize;
use std::path::PathBuf;
use tokio::runtime::Runtime;

pub fn run(url: &str, name: &str, mirror: Option<PathBuf>) -> Result<()> {
    let orch = get_orchestrator()?;
    let config = get_config()?;

    let mirror_dir = mirror
        .or_else(|| config.cloud.mirror_dir.as_ref().map(PathBuf::from))
        .context("No mirror directory configured (set cloud.mirror_dir or pass --mirror)")?;
    let adapter = LocalMirrorAdapter::new(mirror_dir);

    let rt = Runtime::new().context("Failed to create async runtime")?;
    let workflows = rt.block_on(orch.start_batch(name, url, &adapter))?;

    println!(
        "{} Started {} workflow(s) from {}",
        "✓".green(),
        workflows.len(),
        url
    );

    for workflow in &workflows {
        let finished = wait_for_pipeline(&orch, &workflow.id, false)?;
        println!(
            "  {} {} {}",
            short_id(&finished.id).cyan(),
            status_badge(finished.status),
            finished.name
        );
    }

    println!();
    println!(
        "Inspect with: {}",
        "bomflow workflows".cyan()
    );
    Ok(())
}
