//! Database statistics operations.

use crate::database::Database;
use crate::error::DbResult;
use bomflow_core::KbStats;
use std::collections::HashMap;

/// Statistics about the database.
#[derive(Debug, Clone, Default)]
pub struct DatabaseStats {
    pub total_workflows: i64,
    pub workflows_by_status: HashMap<String, i64>,
    pub total_match_results: i64,
    pub kb: KbStats,
}

impl Database {
    /// Get comprehensive database statistics.
    pub fn get_stats(&self) -> DbResult<DatabaseStats> {
        let conn = self.conn()?;

        let total_workflows: i64 =
            conn.query_row("SELECT COUNT(*) FROM workflows", [], |row| row.get(0))?;

        let mut workflows_by_status = HashMap::new();
        {
            let mut stmt =
                conn.prepare("SELECT status, COUNT(*) FROM workflows GROUP BY status")?;
            let rows = stmt.query_map([], |row| {
                let status: String = row.get(0)?;
                let count: i64 = row.get(1)?;
                Ok((status, count))
            })?;
            for row in rows {
                let (status, count) = row?;
                workflows_by_status.insert(status, count);
            }
        }

        let total_match_results: i64 =
            conn.query_row("SELECT COUNT(*) FROM match_results", [], |row| row.get(0))?;

        drop(conn);
        let kb = self.kb_stats()?;

        Ok(DatabaseStats {
            total_workflows,
            workflows_by_status,
            total_match_results,
            kb,
        })
    }
}
