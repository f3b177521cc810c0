//! Initialize bomflow.

use super::get_paths;
use anyhow::{Context, Result};
use bomflow_config::Config;
use bomflow_db::Database;
use colored::Colorize;

pub fn run() -> Result<()> {
    let paths = get_paths()?;

    if paths.is_initialized() {
        println!("{} Bomflow is already initialized.", "Note:".yellow().bold());
        println!("  Config: {}", paths.config_file.display());
        println!("  Database: {}", paths.database_file.display());
        return Ok(());
    }

    println!("{}", "Initializing bomflow...".cyan().bold());

    paths.ensure_dirs().context("Failed to create directories")?;
    println!("  {} Created directories", "✓".green());

    Config::create_default_file(&paths.config_file).context("Failed to create config file")?;
    println!(
        "  {} Created config: {}",
        "✓".green(),
        paths.config_file.display()
    );

    let _db = Database::open(&paths.database_file).context("Failed to initialize database")?;
    println!(
        "  {} Created database: {}",
        "✓".green(),
        paths.database_file.display()
    );

    println!();
    println!("{}", "Bomflow initialized successfully!".green().bold());
    println!();
    println!("Next steps:");
    println!(
        "  1. Review config: {}",
        "bomflow config show".cyan()
    );
    println!(
        "  2. Submit a document: {}",
        "bomflow upload bom.csv --wait".cyan()
    );
    println!(
        "  3. Curate the knowledge base: {}",
        "bomflow kb pending".cyan()
    );

    Ok(())
}
