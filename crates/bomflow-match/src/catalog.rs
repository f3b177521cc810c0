//! In-memory catalog views the matcher compares against.

use bomflow_core::{CandidateItem, KbItem, MatchSource, MatchedRef};
use chrono::{DateTime, Utc};

/// One entry of a catalog view (knowledge base or item master).
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    pub id: String,
    pub identifier: String,
    pub description: String,
    pub source: MatchSource,
    /// Approval timestamp, used for tie-breaking. Item master entries
    /// have none.
    pub decided_at: Option<DateTime<Utc>>,
}

impl CatalogEntry {
    /// View an approved knowledge base item as a catalog entry.
    pub fn from_kb_item(item: &KbItem) -> Self {
        Self {
            id: item.id.clone(),
            identifier: item.identifier.clone(),
            description: item.description.clone(),
            source: MatchSource::KnowledgeBase,
            decided_at: item.decided_at,
        }
    }

    /// View an extracted item master row as a catalog entry.
    ///
    /// The item master is a flat spreadsheet, so the row identifier doubles
    /// as the entry id.
    pub fn from_item_master_row(row: &CandidateItem) -> Self {
        Self {
            id: row.identifier.clone(),
            identifier: row.identifier.clone(),
            description: row.description.clone(),
            source: MatchSource::ItemMaster,
            decided_at: None,
        }
    }

    pub(crate) fn as_matched_ref(&self) -> MatchedRef {
        MatchedRef {
            id: self.id.clone(),
            identifier: self.identifier.clone(),
            description: self.description.clone(),
            source: self.source,
        }
    }
}
