//! Knowledge base commands.

use super::{get_database, short_id};
use anyhow::Result;
use bomflow_core::{KbItem, KbStatus};
use colored::{ColoredString, Colorize};

fn status_badge(status: KbStatus) -> ColoredString {
    match status {
        KbStatus::Pending => status.as_str().yellow(),
        KbStatus::Approved => status.as_str().green(),
        KbStatus::Rejected => status.as_str().red(),
    }
}

fn print_item(item: &KbItem) {
    println!(
        "  {} {:<10} {} — {}",
        short_id(&item.id).cyan(),
        status_badge(item.status),
        item.identifier.bold(),
        item.description
    );
    if let Some(workflow_id) = &item.source_workflow_id {
        println!(
            "      {} from workflow {}",
            "↳".dimmed(),
            short_id(workflow_id)
        );
    }
}

pub fn search(term: &str, limit: i64) -> Result<()> {
    let db = get_database()?;
    let items = db.search_kb_items(term, limit)?;

    if items.is_empty() {
        println!("{}", format!("No items matching '{}'.", term).dimmed());
        return Ok(());
    }

    println!("{}", format!("Items matching '{}'", term).cyan().bold());
    for item in &items {
        print_item(item);
    }
    println!();
    println!("{} item(s)", items.len());
    Ok(())
}

pub fn stats() -> Result<()> {
    let db = get_database()?;
    let stats = db.kb_stats()?;

    println!("{}", "Knowledge Base".cyan().bold());
    println!("  Total:    {}", stats.total);
    println!("  {} Approved: {}", "●".green(), stats.approved);
    println!("  {} Pending:  {}", "○".yellow(), stats.pending);
    println!("  {} Rejected: {}", "✗".red(), stats.rejected);
    Ok(())
}

pub fn pending() -> Result<()> {
    let db = get_database()?;
    let items = db.pending_kb_items()?;

    if items.is_empty() {
        println!("{}", "No items awaiting a decision.".dimmed());
        return Ok(());
    }

    println!("{}", "Pending Items".cyan().bold());
    for item in &items {
        print_item(item);
    }
    println!();
    println!(
        "Decide with: {}",
        "bomflow kb approve <id>... / bomflow kb reject <id>...".cyan()
    );
    Ok(())
}

pub fn approve(ids: &[String]) -> Result<()> {
    let db = get_database()?;
    let count = db.approve_kb_items(ids)?;
    println!(
        "{} Approved {} of {} item(s)",
        "✓".green(),
        count,
        ids.len()
    );
    if count < ids.len() {
        println!(
            "{}",
            "Items already decided or unknown were skipped.".dimmed()
        );
    }
    Ok(())
}

pub fn reject(ids: &[String]) -> Result<()> {
    let db = get_database()?;
    let count = db.reject_kb_items(ids)?;
    println!(
        "{} Rejected {} of {} item(s)",
        "✓".green(),
        count,
        ids.len()
    );
    if count < ids.len() {
        println!(
            "{}",
            "Items already decided or unknown were skipped.".dimmed()
        );
    }
    Ok(())
}

pub fn delete(id: &str) -> Result<()> {
    let db = get_database()?;
    db.delete_kb_item(id)?;
    println!("{} Deleted item {}", "✓".green(), short_id(id).cyan());
    Ok(())
}
