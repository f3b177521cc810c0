//! CLI command implementations.

pub mod batch;
pub mod config;
pub mod delete;
pub mod init;
pub mod kb;
pub mod results;
pub mod review;
pub mod stats;
pub mod status;
pub mod upload;
pub mod workflows;

use anyhow::{Context, Result};
use bomflow_config::{AppPaths, Config};
use bomflow_core::WorkflowStatus;
use bomflow_db::Database;
use bomflow_workflow::Orchestrator;
use colored::{ColoredString, Colorize};

/// Get the application paths.
pub fn get_paths() -> Result<AppPaths> {
    AppPaths::new().context("Failed to determine application directories")
}

/// Load the configuration.
pub fn get_config() -> Result<Config> {
    Config::load().context("Failed to load configuration")
}

/// Get a database handle, ensuring bomflow is initialized.
pub fn get_database() -> Result<Database> {
    let paths = get_paths()?;

    if !paths.is_initialized() {
        anyhow::bail!("Bomflow is not initialized. Run 'bomflow init' first.");
    }

    Database::open(&paths.database_file).context("Failed to open database")
}

/// Build the orchestrator backing all workflow commands.
pub fn get_orchestrator() -> Result<Orchestrator> {
    let paths = get_paths()?;
    let db = get_database()?;
    let config = get_config()?;
    Ok(Orchestrator::new(db, config, &paths.data_dir))
}

/// First eight characters of an id, for compact listings.
pub fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}

/// Colored status word for a workflow.
pub fn status_badge(status: WorkflowStatus) -> ColoredString {
    match status {
        WorkflowStatus::Created => status.as_str().dimmed(),
        WorkflowStatus::Extracting | WorkflowStatus::Matching => status.as_str().blue(),
        WorkflowStatus::AwaitingReview => status.as_str().yellow().bold(),
        WorkflowStatus::Completed => status.as_str().green(),
        WorkflowStatus::Failed => status.as_str().red().bold(),
    }
}
