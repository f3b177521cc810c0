//! Workflow record operations.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use bomflow_core::{ComparisonMode, MatchSummary, Workflow, WorkflowStatus};
use chrono::{DateTime, Utc};
use rusqlite::params;

impl Database {
    /// Create a new workflow record.
    pub fn create_workflow(&self, workflow: &Workflow) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO workflows (id, name, mode, status, error, document_path, item_master_path, summary, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                workflow.id,
                workflow.name,
                workflow.mode.as_str(),
                workflow.status.as_str(),
                workflow.error,
                workflow.document_path,
                workflow.item_master_path,
                workflow
                    .summary
                    .as_ref()
                    .map(serde_json::to_string)
                    .transpose()?,
                workflow.created_at.to_rfc3339(),
                workflow.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get a workflow by ID.
    pub fn get_workflow(&self, id: &str) -> DbResult<Workflow> {
        let conn = self.conn()?;
        let workflow = conn
            .query_row(
                "SELECT id, name, mode, status, error, document_path, item_master_path, summary, created_at, updated_at
                 FROM workflows WHERE id = ?1",
                params![id],
                row_to_workflow,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    DbError::NotFound(format!("Workflow not found: {}", id))
                }
                _ => DbError::from(e),
            })?;

        Ok(workflow)
    }

    /// List all workflows, newest first.
    pub fn list_workflows(&self) -> DbResult<Vec<Workflow>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, mode, status, error, document_path, item_master_path, summary, created_at, updated_at
             FROM workflows ORDER BY created_at DESC",
        )?;
        let workflows = stmt.query_map([], row_to_workflow)?;
        workflows
            .collect::<Result<Vec<_>, _>>()
            .map_err(DbError::from)
    }

    /// Advance a workflow from one pipeline stage to the next.
    ///
    /// The update is guarded on the current status, so a stale pipeline
    /// writing to a deleted or already-moved workflow is a no-op. Returns
    /// whether the transition actually happened.
    pub fn advance_workflow_status(
        &self,
        id: &str,
        from: WorkflowStatus,
        to: WorkflowStatus,
    ) -> DbResult<bool> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        let rows = conn.execute(
            "UPDATE workflows SET status = ?3, updated_at = ?4 WHERE id = ?1 AND status = ?2",
            params![id, from.as_str(), to.as_str(), now],
        )?;

        Ok(rows == 1)
    }

    /// Mark a workflow as failed with a cause.
    ///
    /// Only non-terminal workflows can fail; returns whether the row was
    /// updated.
    pub fn mark_workflow_failed(&self, id: &str, error: &str) -> DbResult<bool> {
        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        let rows = conn.execute(
            "UPDATE workflows SET status = 'failed', error = ?2, updated_at = ?3
             WHERE id = ?1 AND status NOT IN ('completed', 'failed')",
            params![id, error, now],
        )?;

        Ok(rows == 1)
    }

    /// Delete a workflow; match results cascade.
    pub fn delete_workflow(&self, id: &str) -> DbResult<()> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM workflows WHERE id = ?1", params![id])?;

        if rows == 0 {
            return Err(DbError::NotFound(format!("Workflow not found: {}", id)));
        }

        Ok(())
    }
}

fn row_to_workflow(row: &rusqlite::Row) -> rusqlite::Result<Workflow> {
    let mode_str: String = row.get(2)?;
    let status_str: String = row.get(3)?;
    let summary_str: Option<String> = row.get(7)?;
    let created_at_str: String = row.get(8)?;
    let updated_at_str: String = row.get(9)?;

    Ok(Workflow {
        id: row.get(0)?,
        name: row.get(1)?,
        mode: ComparisonMode::from_str(&mode_str).unwrap_or(ComparisonMode::KbOnly),
        status: WorkflowStatus::from_str(&status_str).unwrap_or(WorkflowStatus::Created),
        error: row.get(4)?,
        document_path: row.get(5)?,
        item_master_path: row.get(6)?,
        summary: summary_str.and_then(|s| serde_json::from_str::<MatchSummary>(&s).ok()),
        created_at: parse_rfc3339(&created_at_str),
        updated_at: parse_rfc3339(&updated_at_str),
    })
}

pub(crate) fn parse_rfc3339(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
