//! Match result persistence.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use bomflow_core::{
    CandidateItem, MatchClass, MatchResult, MatchSource, MatchSummary, MatchedRef,
};
use chrono::Utc;
use rusqlite::{params, Transaction};

impl Database {
    /// Persist the pipeline's result set and move the workflow from
    /// `matching` to `awaiting_review`.
    ///
    /// Guarded on the current status: if the workflow was deleted or moved
    /// while matching ran, nothing is written and `false` is returned.
    pub fn complete_matching(
        &self,
        workflow_id: &str,
        results: &[MatchResult],
        summary: &MatchSummary,
    ) -> DbResult<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        let rows = tx.execute(
            "UPDATE workflows SET status = 'awaiting_review', summary = ?2, updated_at = ?3
             WHERE id = ?1 AND status = 'matching'",
            params![workflow_id, serde_json::to_string(summary)?, now],
        )?;

        if rows == 0 {
            return Ok(false);
        }

        replace_results(&tx, workflow_id, results)?;
        tx.commit()?;
        Ok(true)
    }

    /// Overwrite a workflow's results with a reviewed/edited set and mark
    /// it completed.
    ///
    /// Only valid once the workflow has reached review; returns `false`
    /// when the status guard rejects the write.
    pub fn apply_review(
        &self,
        workflow_id: &str,
        results: &[MatchResult],
        summary: &MatchSummary,
    ) -> DbResult<bool> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let now = Utc::now().to_rfc3339();

        let rows = tx.execute(
            "UPDATE workflows SET status = 'completed', summary = ?2, updated_at = ?3
             WHERE id = ?1 AND status IN ('awaiting_review', 'completed')",
            params![workflow_id, serde_json::to_string(summary)?, now],
        )?;

        if rows == 0 {
            return Ok(false);
        }

        replace_results(&tx, workflow_id, results)?;
        tx.commit()?;
        Ok(true)
    }

    /// Fetch a workflow's match results in extraction order.
    pub fn get_match_results(&self, workflow_id: &str) -> DbResult<Vec<MatchResult>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, workflow_id, position, identifier, description, quantity, attributes,
                    source_file, matched_id, matched_identifier, matched_description,
                    match_source, confidence, classification, edited
             FROM match_results WHERE workflow_id = ?1 ORDER BY position ASC",
        )?;

        let results = stmt.query_map(params![workflow_id], row_to_match_result)?;
        results
            .collect::<Result<Vec<_>, _>>()
            .map_err(DbError::from)
    }
}

fn replace_results(tx: &Transaction, workflow_id: &str, results: &[MatchResult]) -> DbResult<()> {
    tx.execute(
        "DELETE FROM match_results WHERE workflow_id = ?1",
        params![workflow_id],
    )?;

    let mut stmt = tx.prepare(
        r#"
        INSERT INTO match_results (id, workflow_id, position, identifier, description, quantity,
                                   attributes, source_file, matched_id, matched_identifier,
                                   matched_description, match_source, confidence, classification, edited)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
        "#,
    )?;

    for result in results {
        stmt.execute(params![
            result.id,
            workflow_id,
            result.candidate.position as i64,
            result.candidate.identifier,
            result.candidate.description,
            result.candidate.quantity,
            result.candidate.attributes.to_string(),
            result.candidate.source_file,
            result.matched.as_ref().map(|m| m.id.as_str()),
            result.matched.as_ref().map(|m| m.identifier.as_str()),
            result.matched.as_ref().map(|m| m.description.as_str()),
            result.matched.as_ref().map(|m| m.source.as_str()),
            result.confidence,
            result.classification.as_str(),
            result.edited as i64,
        ])?;
    }

    Ok(())
}

fn row_to_match_result(row: &rusqlite::Row) -> rusqlite::Result<MatchResult> {
    let position: i64 = row.get(2)?;
    let attributes_str: String = row.get(6)?;
    let matched_id: Option<String> = row.get(8)?;
    let match_source_str: Option<String> = row.get(11)?;
    let classification_str: String = row.get(13)?;
    let edited: i64 = row.get(14)?;

    let candidate = CandidateItem {
        identifier: row.get(3)?,
        description: row.get(4)?,
        quantity: row.get(5)?,
        attributes: serde_json::from_str(&attributes_str).unwrap_or_default(),
        source_file: row.get(7)?,
        position: position as usize,
    };

    let matched = match matched_id {
        Some(id) => Some(MatchedRef {
            id,
            identifier: row.get::<_, Option<String>>(9)?.unwrap_or_default(),
            description: row.get::<_, Option<String>>(10)?.unwrap_or_default(),
            source: match_source_str
                .and_then(|s| MatchSource::from_str(&s))
                .unwrap_or(MatchSource::KnowledgeBase),
        }),
        None => None,
    };

    Ok(MatchResult {
        id: row.get(0)?,
        workflow_id: row.get(1)?,
        candidate,
        matched,
        confidence: row.get(12)?,
        classification: MatchClass::from_str(&classification_str).unwrap_or(MatchClass::Unmatched),
        edited: edited != 0,
    })
}
