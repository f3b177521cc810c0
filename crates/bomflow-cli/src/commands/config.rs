//! Config commands.

use super::{get_config, get_paths};
use anyhow::{Context, Result};
use bomflow_config::Config;
use colored::Colorize;

pub fn show() -> Result<()> {
    let paths = get_paths()?;
    let config = get_config()?;

    println!("{}", "Bomflow Configuration".cyan().bold());
    println!("  File: {}", paths.config_file.display());
    println!();

    let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
    println!("{}", rendered);
    Ok(())
}

pub fn init() -> Result<()> {
    let paths = get_paths()?;

    if paths.config_file.exists() {
        anyhow::bail!(
            "Config file already exists: {}",
            paths.config_file.display()
        );
    }

    Config::create_default_file(&paths.config_file).context("Failed to create config file")?;
    println!(
        "{} Created config: {}",
        "✓".green(),
        paths.config_file.display()
    );
    Ok(())
}
