//! Workflow lifecycle orchestration.

use crate::cloud::CloudAdapter;
use crate::error::{WorkflowError, WorkflowResult};
use crate::storage::DocumentStore;
use bomflow_config::Config;
use bomflow_core::{
    CandidateItem, ComparisonMode, KbItem, MatchClass, MatchResult, MatchSummary, Workflow,
    WorkflowStatus,
};
use bomflow_db::Database;
use bomflow_extract::{ExtractResult, Extractor};
use bomflow_match::{match_candidates, CatalogEntry, MatchConfig};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Extraction seam, so the pipeline can be driven with a stand-in
/// extractor in tests.
pub trait DocumentExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> ExtractResult<Vec<CandidateItem>>;
}

impl DocumentExtractor for Extractor {
    fn extract(&self, path: &Path) -> ExtractResult<Vec<CandidateItem>> {
        Extractor::extract(self, path)
    }
}

/// A request to process one document.
#[derive(Debug, Clone)]
pub struct StartWorkflow {
    pub name: String,
    pub mode: ComparisonMode,
    pub document: PathBuf,
    pub item_master: Option<PathBuf>,
}

/// Drives workflows through the extract/match/review lifecycle.
///
/// `start_workflow` returns as soon as the workflow row exists; the
/// pipeline itself runs on the blocking thread pool and records its
/// outcome in the database. All stage transitions are guarded on the
/// current status, so a workflow deleted mid-flight simply stops
/// progressing.
#[derive(Clone)]
pub struct Orchestrator {
    db: Database,
    config: Config,
    store: DocumentStore,
    extractor: Arc<dyn DocumentExtractor>,
}

impl Orchestrator {
    pub fn new(db: Database, config: Config, data_dir: impl AsRef<Path>) -> Self {
        let store = DocumentStore::new(data_dir.as_ref().join(&config.storage.uploads_dir));
        Self {
            db,
            config,
            store,
            extractor: Arc::new(Extractor::new()),
        }
    }

    /// Replace the document extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn DocumentExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Submit a document for processing.
    ///
    /// Validation happens before any row or directory is created. On
    /// success the workflow is already in `extracting` and the pipeline is
    /// running; the returned record is a snapshot, not a live view.
    pub async fn start_workflow(&self, request: StartWorkflow) -> WorkflowResult<Workflow> {
        if request.name.trim().is_empty() {
            return Err(WorkflowError::Validation(
                "workflow name must not be empty".to_string(),
            ));
        }
        if request.mode == ComparisonMode::Full && request.item_master.is_none() {
            return Err(WorkflowError::Validation(
                "full comparison requires an item master".to_string(),
            ));
        }
        if !request.document.is_file() {
            return Err(WorkflowError::Validation(format!(
                "document not found: {}",
                request.document.display()
            )));
        }
        if let Some(master) = &request.item_master {
            if !master.is_file() {
                return Err(WorkflowError::Validation(format!(
                    "item master not found: {}",
                    master.display()
                )));
            }
        }

        let mut workflow = Workflow::new(&request.name, request.mode, "");

        let stored = self.store.store(&workflow.id, &request.document)?;
        info!(
            "Workflow {}: stored document {} (sha256 {})",
            workflow.id,
            stored.path.display(),
            stored.sha256
        );
        workflow.document_path = stored.path.display().to_string();

        if let Some(master) = &request.item_master {
            let stored_master = self.store.store(&workflow.id, master)?;
            workflow.item_master_path = Some(stored_master.path.display().to_string());
        }

        if let Err(e) = self.db.create_workflow(&workflow) {
            let _ = self.store.remove(&workflow.id);
            return Err(e.into());
        }
        self.db.advance_workflow_status(
            &workflow.id,
            WorkflowStatus::Created,
            WorkflowStatus::Extracting,
        )?;
        workflow.status = WorkflowStatus::Extracting;

        self.spawn_pipeline(workflow.clone());
        Ok(workflow)
    }

    /// Retrieve documents from a shared folder and start one workflow per
    /// file.
    ///
    /// Batch workflows always run in `kb_only` mode and are named
    /// "{base} - WI|QC - {filename}".
    pub async fn start_batch(
        &self,
        base_name: &str,
        url: &str,
        adapter: &dyn CloudAdapter,
    ) -> WorkflowResult<Vec<Workflow>> {
        let files = adapter.download_files_from_url(url)?;
        if files.is_empty() {
            return Err(WorkflowError::Validation(
                "no files retrieved from shared folder".to_string(),
            ));
        }

        info!("Batch '{}': {} documents retrieved", base_name, files.len());

        let mut workflows = Vec::with_capacity(files.len());
        for file in files {
            let name = format!("{} - {} - {}", base_name, file.kind.label(), file.name);
            let workflow = self
                .start_workflow(StartWorkflow {
                    name,
                    mode: ComparisonMode::KbOnly,
                    document: file.path,
                    item_master: None,
                })
                .await?;
            workflows.push(workflow);
        }
        Ok(workflows)
    }

    /// Current state of a workflow.
    pub fn status(&self, id: &str) -> WorkflowResult<Workflow> {
        Ok(self.db.get_workflow(id)?)
    }

    /// All workflows, newest first.
    pub fn list(&self) -> WorkflowResult<Vec<Workflow>> {
        Ok(self.db.list_workflows()?)
    }

    /// A workflow's match results, once it has reached review.
    ///
    /// A failed workflow reports its recorded cause; a workflow still in
    /// the pipeline has no results yet.
    pub fn results(&self, id: &str) -> WorkflowResult<(Workflow, Vec<MatchResult>)> {
        let workflow = self.db.get_workflow(id)?;

        if workflow.status == WorkflowStatus::Failed {
            let cause = workflow
                .error
                .clone()
                .unwrap_or_else(|| "unknown failure".to_string());
            return Err(WorkflowError::Failed(cause));
        }
        if !workflow.status.is_reviewable() {
            return Err(WorkflowError::NotFound(format!(
                "No results yet for workflow {} (status: {})",
                id, workflow.status
            )));
        }

        let results = self.db.get_match_results(id)?;
        Ok((workflow, results))
    }

    /// Store a reviewed result set verbatim and mark the workflow
    /// completed.
    pub fn update_results(
        &self,
        id: &str,
        results: Vec<MatchResult>,
        summary: Option<MatchSummary>,
    ) -> WorkflowResult<MatchSummary> {
        let workflow = self.db.get_workflow(id)?;
        if !workflow.status.is_reviewable() {
            return Err(WorkflowError::Conflict(format!(
                "Workflow {} cannot be reviewed (status: {})",
                id, workflow.status
            )));
        }

        for result in &results {
            if result.workflow_id != id {
                return Err(WorkflowError::Validation(format!(
                    "result {} belongs to workflow {}",
                    result.id, result.workflow_id
                )));
            }
        }

        let summary = summary.unwrap_or_else(|| MatchSummary::from_results(&results));
        if !self.db.apply_review(id, &results, &summary)? {
            return Err(WorkflowError::Conflict(format!(
                "Workflow {} changed while the review was submitted",
                id
            )));
        }
        Ok(summary)
    }

    /// Delete a workflow, its results, and its stored documents.
    pub fn delete_workflow(&self, id: &str) -> WorkflowResult<()> {
        self.db.delete_workflow(id)?;
        if let Err(e) = self.store.remove(id) {
            warn!("Could not remove upload directory for {}: {}", id, e);
        }
        info!("Deleted workflow {}", id);
        Ok(())
    }

    fn spawn_pipeline(&self, workflow: Workflow) {
        let db = self.db.clone();
        let extractor = Arc::clone(&self.extractor);
        let match_config = MatchConfig {
            fuzzy_threshold: self.config.matching.fuzzy_threshold,
            identifier_weight: self.config.matching.identifier_weight,
            description_weight: self.config.matching.description_weight,
        };

        tokio::task::spawn_blocking(move || {
            if let Err(e) = run_pipeline(&db, extractor.as_ref(), &match_config, &workflow) {
                warn!("Workflow {} failed: {}", workflow.id, e);
                if let Err(db_err) = db.mark_workflow_failed(&workflow.id, &e.to_string()) {
                    warn!(
                        "Could not record failure for workflow {}: {}",
                        workflow.id, db_err
                    );
                }
            }
        });
    }
}

fn run_pipeline(
    db: &Database,
    extractor: &dyn DocumentExtractor,
    match_config: &MatchConfig,
    workflow: &Workflow,
) -> WorkflowResult<()> {
    let candidates = extractor.extract(Path::new(&workflow.document_path))?;
    debug!(
        "Workflow {}: extracted {} candidates",
        workflow.id,
        candidates.len()
    );

    if !db.advance_workflow_status(
        &workflow.id,
        WorkflowStatus::Extracting,
        WorkflowStatus::Matching,
    )? {
        debug!("Workflow {} is gone or moved on, stopping", workflow.id);
        return Ok(());
    }

    let kb_view: Vec<CatalogEntry> = db
        .approved_kb_items()?
        .iter()
        .map(CatalogEntry::from_kb_item)
        .collect();

    let master_view: Option<Vec<CatalogEntry>> = match &workflow.item_master_path {
        Some(path) if workflow.mode == ComparisonMode::Full => Some(
            extractor
                .extract(Path::new(path))?
                .iter()
                .map(CatalogEntry::from_item_master_row)
                .collect(),
        ),
        _ => None,
    };

    let results = match_candidates(
        &workflow.id,
        candidates,
        &kb_view,
        master_view.as_deref(),
        match_config,
    );
    let summary = MatchSummary::from_results(&results);

    if !db.complete_matching(&workflow.id, &results, &summary)? {
        debug!(
            "Workflow {} disappeared before results landed, discarding",
            workflow.id
        );
        return Ok(());
    }

    promote_unmatched(db, &workflow.id, &results)?;

    info!(
        "Workflow {} awaiting review: {} exact, {} fuzzy, {} unmatched",
        workflow.id, summary.exact, summary.fuzzy, summary.unmatched
    );
    Ok(())
}

/// Feed unmatched candidates into the knowledge base as pending items,
/// referencing the workflow that surfaced them.
fn promote_unmatched(
    db: &Database,
    workflow_id: &str,
    results: &[MatchResult],
) -> WorkflowResult<()> {
    let items: Vec<KbItem> = results
        .iter()
        .filter(|r| r.classification == MatchClass::Unmatched)
        .map(|r| {
            KbItem::new(&r.candidate.identifier, &r.candidate.description)
                .with_attributes(r.candidate.attributes.clone())
                .with_source_workflow(workflow_id)
        })
        .collect();

    if items.is_empty() {
        return Ok(());
    }

    db.insert_kb_items(&items)?;
    info!(
        "Workflow {}: promoted {} unmatched candidates to pending knowledge base items",
        workflow_id,
        items.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::LocalMirrorAdapter;
    use bomflow_core::{KbStatus, MatchSource};
    use chrono::Utc;
    use std::time::Duration;
    use tempfile::TempDir;

    fn orchestrator() -> (Orchestrator, TempDir) {
        let data_dir = TempDir::new().unwrap();
        let db = Database::open_in_memory().unwrap();
        let orch = Orchestrator::new(db, Config::default(), data_dir.path());
        (orch, data_dir)
    }

    fn write_doc(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn approved_kb_item(identifier: &str, description: &str) -> KbItem {
        let mut item = KbItem::new(identifier, description);
        item.status = KbStatus::Approved;
        item.decided_at = Some(Utc::now());
        item
    }

    async fn wait_for_status(orch: &Orchestrator, id: &str, want: WorkflowStatus) -> Workflow {
        for _ in 0..500 {
            let wf = orch.status(id).unwrap();
            if wf.status == want {
                return wf;
            }
            if wf.status == WorkflowStatus::Failed && want != WorkflowStatus::Failed {
                panic!("workflow failed: {:?}", wf.error);
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("timed out waiting for status {}", want);
    }

    #[tokio::test]
    async fn test_kb_only_pipeline_matches_seeded_item() {
        let (orch, _data_dir) = orchestrator();
        let docs = TempDir::new().unwrap();
        let doc = write_doc(
            &docs,
            "bom.csv",
            "Part Number,Description,Qty\nR-100,10k ohm resistor,4\n",
        );

        orch.database()
            .insert_kb_item(&approved_kb_item("R100", "10k ohm resistor"))
            .unwrap();

        let wf = orch
            .start_workflow(StartWorkflow {
                name: "Line 3 WI".to_string(),
                mode: ComparisonMode::KbOnly,
                document: doc,
                item_master: None,
            })
            .await
            .unwrap();
        assert_eq!(wf.status, WorkflowStatus::Extracting);

        let done = wait_for_status(&orch, &wf.id, WorkflowStatus::AwaitingReview).await;
        assert_eq!(done.summary.as_ref().unwrap().exact, 1);

        let (_, results) = orch.results(&wf.id).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].classification, MatchClass::Exact);
        assert_eq!(results[0].matched.as_ref().unwrap().identifier, "R100");
    }

    #[tokio::test]
    async fn test_full_mode_requires_item_master() {
        let (orch, _data_dir) = orchestrator();
        let docs = TempDir::new().unwrap();
        let doc = write_doc(&docs, "bom.csv", "R100,10k resistor,4\n");

        let err = orch
            .start_workflow(StartWorkflow {
                name: "Line 3".to_string(),
                mode: ComparisonMode::Full,
                document: doc,
                item_master: None,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, WorkflowError::Validation(_)));
        // No row, no upload directory
        assert!(orch.list().unwrap().is_empty());
        assert!(!orch.store.root().exists() || std::fs::read_dir(orch.store.root())
            .unwrap()
            .next()
            .is_none());
    }

    #[tokio::test]
    async fn test_full_mode_uses_item_master() {
        let (orch, _data_dir) = orchestrator();
        let docs = TempDir::new().unwrap();
        let doc = write_doc(&docs, "bom.csv", "R100,10k resistor,4\n");
        let master = write_doc(&docs, "master.csv", "R100,10k resistor,\n");

        let wf = orch
            .start_workflow(StartWorkflow {
                name: "Line 3".to_string(),
                mode: ComparisonMode::Full,
                document: doc,
                item_master: Some(master),
            })
            .await
            .unwrap();

        wait_for_status(&orch, &wf.id, WorkflowStatus::AwaitingReview).await;

        let (_, results) = orch.results(&wf.id).unwrap();
        assert_eq!(
            results[0].matched.as_ref().unwrap().source,
            MatchSource::ItemMaster
        );
    }

    #[tokio::test]
    async fn test_unmatched_candidates_promoted_to_kb() {
        let (orch, _data_dir) = orchestrator();
        let docs = TempDir::new().unwrap();
        let doc = write_doc(&docs, "bom.csv", "C200,ceramic cap 100nF,2\n");

        let wf = orch
            .start_workflow(StartWorkflow {
                name: "Line 3".to_string(),
                mode: ComparisonMode::KbOnly,
                document: doc,
                item_master: None,
            })
            .await
            .unwrap();

        wait_for_status(&orch, &wf.id, WorkflowStatus::AwaitingReview).await;

        let pending = orch.database().pending_kb_items().unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].identifier, "C200");
        assert_eq!(pending[0].source_workflow_id.as_deref(), Some(wf.id.as_str()));
    }

    #[tokio::test]
    async fn test_review_round_trip() {
        let (orch, _data_dir) = orchestrator();
        let docs = TempDir::new().unwrap();
        let doc = write_doc(&docs, "bom.csv", "C200,ceramic cap,2\n");

        let wf = orch
            .start_workflow(StartWorkflow {
                name: "Line 3".to_string(),
                mode: ComparisonMode::KbOnly,
                document: doc,
                item_master: None,
            })
            .await
            .unwrap();
        wait_for_status(&orch, &wf.id, WorkflowStatus::AwaitingReview).await;

        let (_, mut results) = orch.results(&wf.id).unwrap();
        results[0].edited = true;
        results[0].confidence = 1.0;
        results[0].classification = MatchClass::Exact;

        orch.update_results(&wf.id, results.clone(), None).unwrap();

        let (reviewed, stored) = orch.results(&wf.id).unwrap();
        assert_eq!(reviewed.status, WorkflowStatus::Completed);
        assert_eq!(stored, results);
    }

    #[tokio::test]
    async fn test_update_results_before_review_conflicts() {
        let (orch, _data_dir) = orchestrator();
        let docs = TempDir::new().unwrap();
        let doc = write_doc(&docs, "bom.csv", "C200,ceramic cap,2\n");

        // Slow extractor keeps the workflow in the pipeline while we try
        // to review it.
        struct StuckExtractor;
        impl DocumentExtractor for StuckExtractor {
            fn extract(&self, _path: &Path) -> ExtractResult<Vec<CandidateItem>> {
                std::thread::sleep(Duration::from_millis(400));
                Ok(vec![CandidateItem::new("C200", "ceramic cap")])
            }
        }
        let orch = orch.with_extractor(Arc::new(StuckExtractor));

        let wf = orch
            .start_workflow(StartWorkflow {
                name: "Line 3".to_string(),
                mode: ComparisonMode::KbOnly,
                document: doc,
                item_master: None,
            })
            .await
            .unwrap();

        let err = orch.update_results(&wf.id, vec![], None).unwrap_err();
        assert!(matches!(err, WorkflowError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_results_before_review_not_found() {
        let (orch, _data_dir) = orchestrator();
        let docs = TempDir::new().unwrap();
        let doc = write_doc(&docs, "bom.csv", "C200,ceramic cap,2\n");

        struct StuckExtractor;
        impl DocumentExtractor for StuckExtractor {
            fn extract(&self, _path: &Path) -> ExtractResult<Vec<CandidateItem>> {
                std::thread::sleep(Duration::from_millis(400));
                Ok(vec![CandidateItem::new("C200", "ceramic cap")])
            }
        }
        let orch = orch.with_extractor(Arc::new(StuckExtractor));

        let wf = orch
            .start_workflow(StartWorkflow {
                name: "Line 3".to_string(),
                mode: ComparisonMode::KbOnly,
                document: doc,
                item_master: None,
            })
            .await
            .unwrap();

        // Nothing to review while the pipeline is still extracting
        let err = orch.results(&wf.id).unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_delete_mid_pipeline_cancels_quietly() {
        let (orch, _data_dir) = orchestrator();
        let docs = TempDir::new().unwrap();
        let doc = write_doc(&docs, "bom.csv", "R100,10k resistor,4\n");

        struct SlowExtractor;
        impl DocumentExtractor for SlowExtractor {
            fn extract(&self, path: &Path) -> ExtractResult<Vec<CandidateItem>> {
                std::thread::sleep(Duration::from_millis(300));
                Extractor::new().extract(path)
            }
        }
        let orch = orch.with_extractor(Arc::new(SlowExtractor));

        let started = std::time::Instant::now();
        let wf = orch
            .start_workflow(StartWorkflow {
                name: "Line 3".to_string(),
                mode: ComparisonMode::KbOnly,
                document: doc,
                item_master: None,
            })
            .await
            .unwrap();
        // Submission must not wait for extraction
        assert!(started.elapsed() < Duration::from_millis(250));

        orch.delete_workflow(&wf.id).unwrap();

        // Let the stale pipeline finish; its writes must all be no-ops
        tokio::time::sleep(Duration::from_millis(600)).await;

        let err = orch.status(&wf.id).unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
        assert!(orch.database().get_match_results(&wf.id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_extraction_failure_recorded() {
        let (orch, _data_dir) = orchestrator();
        let docs = TempDir::new().unwrap();
        let doc = write_doc(&docs, "notes.md", "# Notes\n\nNo tables here.\n");

        let wf = orch
            .start_workflow(StartWorkflow {
                name: "Line 3".to_string(),
                mode: ComparisonMode::KbOnly,
                document: doc,
                item_master: None,
            })
            .await
            .unwrap();

        let failed = wait_for_status(&orch, &wf.id, WorkflowStatus::Failed).await;
        assert!(failed.error.is_some());

        let err = orch.results(&wf.id).unwrap_err();
        assert!(matches!(err, WorkflowError::Failed(_)));
    }

    #[tokio::test]
    async fn test_delete_unknown_workflow_not_found() {
        let (orch, _data_dir) = orchestrator();
        let err = orch.delete_workflow("nope").unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_batch_starts_one_workflow_per_file() {
        let (orch, _data_dir) = orchestrator();
        let mirror = TempDir::new().unwrap();
        std::fs::create_dir_all(mirror.path().join("qc")).unwrap();
        std::fs::write(mirror.path().join("line3.csv"), "R100,res,1\n").unwrap();
        std::fs::write(mirror.path().join("qc/checks.csv"), "C200,cap,2\n").unwrap();

        let adapter = LocalMirrorAdapter::new(mirror.path());
        let workflows = orch
            .start_batch("Batch 7", "https://example.test/share", &adapter)
            .await
            .unwrap();

        assert_eq!(workflows.len(), 2);
        let names: Vec<&str> = workflows.iter().map(|w| w.name.as_str()).collect();
        assert!(names.contains(&"Batch 7 - WI - line3.csv"));
        assert!(names.contains(&"Batch 7 - QC - checks.csv"));
        assert!(workflows.iter().all(|w| w.mode == ComparisonMode::KbOnly));

        for wf in &workflows {
            wait_for_status(&orch, &wf.id, WorkflowStatus::AwaitingReview).await;
        }
    }

    #[tokio::test]
    async fn test_batch_with_no_files_rejected() {
        let (orch, _data_dir) = orchestrator();
        let mirror = TempDir::new().unwrap();

        let adapter = LocalMirrorAdapter::new(mirror.path());
        let err = orch
            .start_batch("Batch 7", "https://example.test/share", &adapter)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
        assert!(orch.list().unwrap().is_empty());
    }
}
