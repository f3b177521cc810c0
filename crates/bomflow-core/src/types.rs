//! Core domain types for Bomflow.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for workflows.
pub type WorkflowId = String;

/// Unique identifier for knowledge base items.
pub type KbItemId = String;

/// Unique identifier for match results.
pub type MatchResultId = String;

/// Schema version of the results payload exchanged with the review UI.
pub const RESULTS_SCHEMA_VERSION: u32 = 1;

/// Generate a new unique ID.
pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

/// Lifecycle status of a workflow.
///
/// Statuses are monotonic through the pipeline; `Failed` is the only
/// terminal state reachable from any non-terminal stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    Created,
    Extracting,
    Matching,
    AwaitingReview,
    Completed,
    Failed,
}

impl WorkflowStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStatus::Created => "created",
            WorkflowStatus::Extracting => "extracting",
            WorkflowStatus::Matching => "matching",
            WorkflowStatus::AwaitingReview => "awaiting_review",
            WorkflowStatus::Completed => "completed",
            WorkflowStatus::Failed => "failed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "created" => Some(WorkflowStatus::Created),
            "extracting" => Some(WorkflowStatus::Extracting),
            "matching" => Some(WorkflowStatus::Matching),
            "awaiting_review" => Some(WorkflowStatus::AwaitingReview),
            "completed" => Some(WorkflowStatus::Completed),
            "failed" => Some(WorkflowStatus::Failed),
            _ => None,
        }
    }

    /// Whether the workflow has finished its pipeline, for better or worse.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkflowStatus::Completed | WorkflowStatus::Failed)
    }

    /// Whether results exist and can be read or edited.
    pub fn is_reviewable(&self) -> bool {
        matches!(
            self,
            WorkflowStatus::AwaitingReview | WorkflowStatus::Completed
        )
    }
}

impl std::fmt::Display for WorkflowStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How extracted candidates are compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// Compare against the item master first, fall back to the knowledge base.
    Full,
    /// Compare only against the knowledge base.
    KbOnly,
}

impl ComparisonMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonMode::Full => "full",
            ComparisonMode::KbOnly => "kb_only",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "full" => Some(ComparisonMode::Full),
            "kb_only" => Some(ComparisonMode::KbOnly),
            _ => None,
        }
    }
}

impl std::fmt::Display for ComparisonMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One end-to-end processing run over a submitted document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    pub mode: ComparisonMode,
    pub status: WorkflowStatus,
    pub error: Option<String>,
    pub document_path: String,
    pub item_master_path: Option<String>,
    pub summary: Option<MatchSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    pub fn new(
        name: impl Into<String>,
        mode: ComparisonMode,
        document_path: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: new_id(),
            name: name.into(),
            mode,
            status: WorkflowStatus::Created,
            error: None,
            document_path: document_path.into(),
            item_master_path: None,
            summary: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_item_master(mut self, path: impl Into<String>) -> Self {
        self.item_master_path = Some(path.into());
        self
    }
}

/// A raw item record extracted from a document, not yet reconciled.
///
/// Candidates are transient: they feed the matcher and are discarded once
/// match results exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateItem {
    pub identifier: String,
    pub description: String,
    pub quantity: Option<f64>,
    pub attributes: serde_json::Value,
    /// Name of the document the row came from.
    pub source_file: String,
    /// 1-based row position within the source document.
    pub position: usize,
}

impl CandidateItem {
    pub fn new(identifier: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            description: description.into(),
            quantity: None,
            attributes: serde_json::json!({}),
            source_file: String::new(),
            position: 0,
        }
    }

    pub fn with_quantity(mut self, quantity: f64) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_attributes(mut self, attributes: serde_json::Value) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_provenance(mut self, source_file: impl Into<String>, position: usize) -> Self {
        self.source_file = source_file.into();
        self.position = position;
        self
    }
}

/// Outcome category assigned to a candidate after comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchClass {
    Exact,
    Fuzzy,
    Unmatched,
}

impl MatchClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchClass::Exact => "exact",
            MatchClass::Fuzzy => "fuzzy",
            MatchClass::Unmatched => "unmatched",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "exact" => Some(MatchClass::Exact),
            "fuzzy" => Some(MatchClass::Fuzzy),
            "unmatched" => Some(MatchClass::Unmatched),
            _ => None,
        }
    }
}

impl std::fmt::Display for MatchClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which catalog a match reference points into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchSource {
    KnowledgeBase,
    ItemMaster,
}

impl MatchSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchSource::KnowledgeBase => "knowledge_base",
            MatchSource::ItemMaster => "item_master",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "knowledge_base" => Some(MatchSource::KnowledgeBase),
            "item_master" => Some(MatchSource::ItemMaster),
            _ => None,
        }
    }
}

/// The catalog record a candidate was matched to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedRef {
    pub id: String,
    pub identifier: String,
    pub description: String,
    pub source: MatchSource,
}

/// One candidate paired with at most one catalog reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: MatchResultId,
    pub workflow_id: WorkflowId,
    pub candidate: CandidateItem,
    pub matched: Option<MatchedRef>,
    pub confidence: f64,
    pub classification: MatchClass,
    /// Set when a human has modified this result during review.
    pub edited: bool,
}

impl MatchResult {
    pub fn new(workflow_id: impl Into<String>, candidate: CandidateItem) -> Self {
        Self {
            id: new_id(),
            workflow_id: workflow_id.into(),
            candidate,
            matched: None,
            confidence: 0.0,
            classification: MatchClass::Unmatched,
            edited: false,
        }
    }

    pub fn with_match(mut self, matched: MatchedRef, confidence: f64, class: MatchClass) -> Self {
        self.matched = Some(matched);
        self.confidence = confidence;
        self.classification = class;
        self
    }

    pub fn with_best_score(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }
}

/// Aggregate view of one workflow's match results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub schema_version: u32,
    pub total: usize,
    pub exact: usize,
    pub fuzzy: usize,
    pub unmatched: usize,
    pub avg_confidence: f64,
}

impl MatchSummary {
    /// Build a summary from a full result set.
    pub fn from_results(results: &[MatchResult]) -> Self {
        let total = results.len();
        let exact = results
            .iter()
            .filter(|r| r.classification == MatchClass::Exact)
            .count();
        let fuzzy = results
            .iter()
            .filter(|r| r.classification == MatchClass::Fuzzy)
            .count();
        let unmatched = total - exact - fuzzy;
        let avg_confidence = if total == 0 {
            0.0
        } else {
            results.iter().map(|r| r.confidence).sum::<f64>() / total as f64
        };

        Self {
            schema_version: RESULTS_SCHEMA_VERSION,
            total,
            exact,
            fuzzy,
            unmatched,
            avg_confidence,
        }
    }
}

/// Approval status of a knowledge base item.
///
/// `Pending` is the only state an item can be created in; approved and
/// rejected are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum KbStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl KbStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KbStatus::Pending => "pending",
            KbStatus::Approved => "approved",
            KbStatus::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pending" => Some(KbStatus::Pending),
            "approved" => Some(KbStatus::Approved),
            "rejected" => Some(KbStatus::Rejected),
            _ => None,
        }
    }
}

impl std::fmt::Display for KbStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A canonical item record in the curated knowledge base.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbItem {
    pub id: KbItemId,
    pub identifier: String,
    pub description: String,
    pub attributes: serde_json::Value,
    pub status: KbStatus,
    /// Workflow that produced this item, if any. Items can also be seeded
    /// directly.
    pub source_workflow_id: Option<WorkflowId>,
    pub created_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
}

impl KbItem {
    pub fn new(identifier: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            identifier: identifier.into(),
            description: description.into(),
            attributes: serde_json::json!({}),
            status: KbStatus::Pending,
            source_workflow_id: None,
            created_at: Utc::now(),
            decided_at: None,
        }
    }

    pub fn with_attributes(mut self, attributes: serde_json::Value) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_source_workflow(mut self, workflow_id: impl Into<String>) -> Self {
        self.source_workflow_id = Some(workflow_id.into());
        self
    }
}

/// Knowledge base counts by approval status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KbStats {
    pub total: i64,
    pub pending: i64,
    pub approved: i64,
    pub rejected: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workflow_status_round_trip() {
        for status in [
            WorkflowStatus::Created,
            WorkflowStatus::Extracting,
            WorkflowStatus::Matching,
            WorkflowStatus::AwaitingReview,
            WorkflowStatus::Completed,
            WorkflowStatus::Failed,
        ] {
            assert_eq!(WorkflowStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(WorkflowStatus::from_str("bogus"), None);
    }

    #[test]
    fn test_status_predicates() {
        assert!(WorkflowStatus::Failed.is_terminal());
        assert!(WorkflowStatus::Completed.is_terminal());
        assert!(!WorkflowStatus::Matching.is_terminal());

        assert!(WorkflowStatus::AwaitingReview.is_reviewable());
        assert!(WorkflowStatus::Completed.is_reviewable());
        assert!(!WorkflowStatus::Extracting.is_reviewable());
    }

    #[test]
    fn test_comparison_mode_round_trip() {
        assert_eq!(ComparisonMode::from_str("full"), Some(ComparisonMode::Full));
        assert_eq!(
            ComparisonMode::from_str("KB_ONLY"),
            Some(ComparisonMode::KbOnly)
        );
        assert_eq!(ComparisonMode::from_str("partial"), None);
    }

    #[test]
    fn test_workflow_creation() {
        let wf = Workflow::new("Line 3 WI", ComparisonMode::Full, "/uploads/doc.csv")
            .with_item_master("/uploads/master.csv");

        assert_eq!(wf.status, WorkflowStatus::Created);
        assert!(wf.error.is_none());
        assert_eq!(wf.item_master_path.as_deref(), Some("/uploads/master.csv"));
        assert!(!wf.id.is_empty());
    }

    #[test]
    fn test_candidate_builder() {
        let candidate = CandidateItem::new("R100", "10k resistor")
            .with_quantity(4.0)
            .with_provenance("bom.csv", 2);

        assert_eq!(candidate.identifier, "R100");
        assert_eq!(candidate.quantity, Some(4.0));
        assert_eq!(candidate.source_file, "bom.csv");
        assert_eq!(candidate.position, 2);
    }

    #[test]
    fn test_summary_from_results() {
        let wf_id = new_id();
        let exact = MatchResult::new(&wf_id, CandidateItem::new("A", "a")).with_match(
            MatchedRef {
                id: new_id(),
                identifier: "A".to_string(),
                description: "a".to_string(),
                source: MatchSource::KnowledgeBase,
            },
            1.0,
            MatchClass::Exact,
        );
        let unmatched =
            MatchResult::new(&wf_id, CandidateItem::new("B", "b")).with_best_score(0.2);

        let summary = MatchSummary::from_results(&[exact, unmatched]);
        assert_eq!(summary.schema_version, RESULTS_SCHEMA_VERSION);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.exact, 1);
        assert_eq!(summary.fuzzy, 0);
        assert_eq!(summary.unmatched, 1);
        assert!((summary.avg_confidence - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_summary_empty() {
        let summary = MatchSummary::from_results(&[]);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.avg_confidence, 0.0);
    }
}
