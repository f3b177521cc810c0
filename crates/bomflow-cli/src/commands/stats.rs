//! Stats command - database statistics.

use super::get_database;
use anyhow::Result;
use bomflow_core::WorkflowStatus;
use colored::Colorize;

pub fn run() -> Result<()> {
    let db = get_database()?;
    let stats = db.get_stats()?;

    println!("{}", "Bomflow Statistics".cyan().bold());
    println!();
    println!("{}", "Workflows".white().bold());
    println!("  Total: {}", stats.total_workflows);
    for status in [
        WorkflowStatus::Created,
        WorkflowStatus::Extracting,
        WorkflowStatus::Matching,
        WorkflowStatus::AwaitingReview,
        WorkflowStatus::Completed,
        WorkflowStatus::Failed,
    ] {
        if let Some(count) = stats.workflows_by_status.get(status.as_str()) {
            println!("  {:<16} {}", status.as_str(), count);
        }
    }

    println!();
    println!("{}", "Match Results".white().bold());
    println!("  Total: {}", stats.total_match_results);

    println!();
    println!("{}", "Knowledge Base".white().bold());
    println!("  Total:    {}", stats.kb.total);
    println!("  Approved: {}", stats.kb.approved);
    println!("  Pending:  {}", stats.kb.pending);
    println!("  Rejected: {}", stats.kb.rejected);

    Ok(())
}
