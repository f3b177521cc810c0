//! Knowledge base store operations.

use crate::database::Database;
use crate::error::{DbError, DbResult};
use crate::operations::workflows::parse_rfc3339;
use bomflow_core::{KbItem, KbStats, KbStatus};
use chrono::Utc;
use rusqlite::{params, params_from_iter};

const KB_COLUMNS: &str =
    "id, identifier, description, attributes, status, source_workflow_id, created_at, decided_at";

impl Database {
    /// Insert a knowledge base item. New items are always pending.
    pub fn insert_kb_item(&self, item: &KbItem) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute(
            r#"
            INSERT INTO kb_items (id, identifier, description, attributes, status, source_workflow_id, created_at, decided_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
            params![
                item.id,
                item.identifier,
                item.description,
                item.attributes.to_string(),
                item.status.as_str(),
                item.source_workflow_id,
                item.created_at.to_rfc3339(),
                item.decided_at.map(|dt| dt.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    /// Insert a batch of knowledge base items.
    pub fn insert_kb_items(&self, items: &[KbItem]) -> DbResult<()> {
        for item in items {
            self.insert_kb_item(item)?;
        }
        Ok(())
    }

    /// Get a knowledge base item by ID.
    pub fn get_kb_item(&self, id: &str) -> DbResult<KbItem> {
        let conn = self.conn()?;
        let item = conn
            .query_row(
                &format!("SELECT {} FROM kb_items WHERE id = ?1", KB_COLUMNS),
                params![id],
                row_to_kb_item,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    DbError::NotFound(format!("Knowledge base item not found: {}", id))
                }
                _ => DbError::from(e),
            })?;

        Ok(item)
    }

    /// Search knowledge base items by identifier or description.
    ///
    /// Case-insensitive substring match, most recently decided first
    /// (undecided items last, newest created first among those).
    pub fn search_kb_items(&self, term: &str, limit: i64) -> DbResult<Vec<KbItem>> {
        let conn = self.conn()?;

        // Escape LIKE metacharacters so the term is a literal substring
        let escaped = term
            .to_lowercase()
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        let pattern = format!("%{}%", escaped);

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM kb_items
             WHERE LOWER(identifier) LIKE ?1 ESCAPE '\\'
                OR LOWER(description) LIKE ?1 ESCAPE '\\'
             ORDER BY decided_at IS NULL, decided_at DESC, created_at DESC
             LIMIT ?2",
            KB_COLUMNS
        ))?;

        let items = stmt.query_map(params![pattern, limit], row_to_kb_item)?;
        items.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Get knowledge base counts by approval status.
    pub fn kb_stats(&self) -> DbResult<KbStats> {
        let conn = self.conn()?;

        let mut stats = KbStats::default();
        let mut stmt = conn.prepare("SELECT status, COUNT(*) FROM kb_items GROUP BY status")?;
        let rows = stmt.query_map([], |row| {
            let status: String = row.get(0)?;
            let count: i64 = row.get(1)?;
            Ok((status, count))
        })?;

        for row in rows {
            let (status, count) = row?;
            stats.total += count;
            match KbStatus::from_str(&status) {
                Some(KbStatus::Pending) => stats.pending = count,
                Some(KbStatus::Approved) => stats.approved = count,
                Some(KbStatus::Rejected) => stats.rejected = count,
                None => {}
            }
        }

        Ok(stats)
    }

    /// Get all items awaiting an approve/reject decision, oldest first.
    pub fn pending_kb_items(&self) -> DbResult<Vec<KbItem>> {
        self.kb_items_by_status(KbStatus::Pending)
    }

    /// Get all approved items. This is the matcher's knowledge base view.
    pub fn approved_kb_items(&self) -> DbResult<Vec<KbItem>> {
        self.kb_items_by_status(KbStatus::Approved)
    }

    fn kb_items_by_status(&self, status: KbStatus) -> DbResult<Vec<KbItem>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM kb_items WHERE status = ?1 ORDER BY created_at ASC",
            KB_COLUMNS
        ))?;
        let items = stmt.query_map(params![status.as_str()], row_to_kb_item)?;
        items.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }

    /// Approve the given pending items. Returns the number of items this
    /// call actually transitioned; ids that are missing or no longer
    /// pending are skipped.
    pub fn approve_kb_items(&self, ids: &[String]) -> DbResult<usize> {
        self.decide_kb_items(ids, KbStatus::Approved)
    }

    /// Reject the given pending items. Symmetric to approve.
    pub fn reject_kb_items(&self, ids: &[String]) -> DbResult<usize> {
        self.decide_kb_items(ids, KbStatus::Rejected)
    }

    fn decide_kb_items(&self, ids: &[String], decision: KbStatus) -> DbResult<usize> {
        if ids.is_empty() {
            return Ok(0);
        }

        let conn = self.conn()?;
        let now = Utc::now().to_rfc3339();

        // One guarded UPDATE: only pending rows transition, and the count
        // reflects exactly the rows this statement changed.
        let placeholders = ids.iter().map(|_| "?").collect::<Vec<_>>().join(", ");
        let sql = format!(
            "UPDATE kb_items SET status = ?1, decided_at = ?2
             WHERE status = 'pending' AND id IN ({})",
            placeholders
        );

        let mut bindings: Vec<String> = vec![decision.as_str().to_string(), now];
        bindings.extend(ids.iter().cloned());

        let rows = conn.execute(&sql, params_from_iter(bindings.iter()))?;
        Ok(rows)
    }

    /// Delete a knowledge base item by ID.
    pub fn delete_kb_item(&self, id: &str) -> DbResult<()> {
        let conn = self.conn()?;
        let rows = conn.execute("DELETE FROM kb_items WHERE id = ?1", params![id])?;

        if rows == 0 {
            return Err(DbError::NotFound(format!(
                "Knowledge base item not found: {}",
                id
            )));
        }

        Ok(())
    }
}

fn row_to_kb_item(row: &rusqlite::Row) -> rusqlite::Result<KbItem> {
    let attributes_str: String = row.get(3)?;
    let status_str: String = row.get(4)?;
    let created_at_str: String = row.get(6)?;
    let decided_at_str: Option<String> = row.get(7)?;

    Ok(KbItem {
        id: row.get(0)?,
        identifier: row.get(1)?,
        description: row.get(2)?,
        attributes: serde_json::from_str(&attributes_str).unwrap_or_default(),
        status: KbStatus::from_str(&status_str).unwrap_or(KbStatus::Pending),
        source_workflow_id: row.get(5)?,
        created_at: parse_rfc3339(&created_at_str),
        decided_at: decided_at_str.map(|s| parse_rfc3339(&s)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kb_item_crud() {
        let db = Database::open_in_memory().unwrap();

        let item = KbItem::new("R100", "10k ohm resistor");
        db.insert_kb_item(&item).unwrap();

        let fetched = db.get_kb_item(&item.id).unwrap();
        assert_eq!(fetched.identifier, "R100");
        assert_eq!(fetched.status, KbStatus::Pending);

        db.delete_kb_item(&item.id).unwrap();
        assert!(db.get_kb_item(&item.id).is_err());
    }

    #[test]
    fn test_delete_missing_kb_item() {
        let db = Database::open_in_memory().unwrap();
        let err = db.delete_kb_item("nope").unwrap_err();
        assert!(matches!(err, DbError::NotFound(_)));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let db = Database::open_in_memory().unwrap();

        db.insert_kb_item(&KbItem::new("R100", "10k OHM Resistor"))
            .unwrap();
        db.insert_kb_item(&KbItem::new("C200", "ceramic capacitor"))
            .unwrap();

        let hits = db.search_kb_items("resistor", 50).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].identifier, "R100");

        let hits = db.search_kb_items("c2", 50).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].identifier, "C200");

        // Empty term matches everything, bounded by limit
        let hits = db.search_kb_items("", 1).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let db = Database::open_in_memory().unwrap();

        db.insert_kb_item(&KbItem::new("P1", "100% cotton webbing"))
            .unwrap();
        db.insert_kb_item(&KbItem::new("P2", "100 pct cotton webbing"))
            .unwrap();
        db.insert_kb_item(&KbItem::new("BOLT_M4", "hex bolt"))
            .unwrap();
        db.insert_kb_item(&KbItem::new("BOLTXM4", "hex bolt"))
            .unwrap();

        // '%' must not act as a wildcard
        let hits = db.search_kb_items("100%", 50).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].identifier, "P1");

        // '_' must not match an arbitrary character
        let hits = db.search_kb_items("bolt_m", 50).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].identifier, "BOLT_M4");
    }

    #[test]
    fn test_search_orders_decided_first() {
        let db = Database::open_in_memory().unwrap();

        let undecided = KbItem::new("A1", "bracket");
        let decided = KbItem::new("A2", "bracket");
        db.insert_kb_item(&undecided).unwrap();
        db.insert_kb_item(&decided).unwrap();
        db.approve_kb_items(&[decided.id.clone()]).unwrap();

        let hits = db.search_kb_items("bracket", 50).unwrap();
        assert_eq!(hits[0].id, decided.id);
        assert_eq!(hits[1].id, undecided.id);
    }

    #[test]
    fn test_approve_skips_non_pending() {
        let db = Database::open_in_memory().unwrap();

        let a = KbItem::new("A", "part a");
        let b = KbItem::new("B", "part b");
        db.insert_kb_item(&a).unwrap();
        db.insert_kb_item(&b).unwrap();
        db.reject_kb_items(&[b.id.clone()]).unwrap();

        // "A" is pending, "B" already rejected
        let count = db
            .approve_kb_items(&[a.id.clone(), b.id.clone()])
            .unwrap();
        assert_eq!(count, 1);

        assert_eq!(db.get_kb_item(&a.id).unwrap().status, KbStatus::Approved);
        assert_eq!(db.get_kb_item(&b.id).unwrap().status, KbStatus::Rejected);
    }

    #[test]
    fn test_approve_is_idempotent() {
        let db = Database::open_in_memory().unwrap();

        let item = KbItem::new("X", "widget");
        db.insert_kb_item(&item).unwrap();

        assert_eq!(db.approve_kb_items(&[item.id.clone()]).unwrap(), 1);
        assert_eq!(db.approve_kb_items(&[item.id.clone()]).unwrap(), 0);

        let fetched = db.get_kb_item(&item.id).unwrap();
        assert_eq!(fetched.status, KbStatus::Approved);
        assert!(fetched.decided_at.is_some());
    }

    #[test]
    fn test_empty_id_list_is_noop() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.approve_kb_items(&[]).unwrap(), 0);
        assert_eq!(db.reject_kb_items(&[]).unwrap(), 0);
    }

    #[test]
    fn test_stats_track_transitions() {
        let db = Database::open_in_memory().unwrap();

        let a = KbItem::new("A", "part a");
        let b = KbItem::new("B", "part b");
        let c = KbItem::new("C", "part c");
        db.insert_kb_items(&[a.clone(), b.clone(), c.clone()])
            .unwrap();

        db.approve_kb_items(&[a.id]).unwrap();
        db.reject_kb_items(&[b.id]).unwrap();

        let stats = db.kb_stats().unwrap();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.pending, 1);
        assert_eq!(stats.approved, 1);
        assert_eq!(stats.rejected, 1);

        let pending = db.pending_kb_items().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].identifier, "C");
    }
}
