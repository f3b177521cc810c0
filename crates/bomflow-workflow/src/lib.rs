//! Bomflow Workflow - Orchestration of the document processing pipeline.
//!
//! Owns the workflow lifecycle: document storage, the asynchronous
//! extract/match pipeline, guarded stage transitions, the review loop,
//! and promotion of unmatched candidates into the knowledge base. Also
//! home to the cloud ingestion adapter used for batch submissions.

mod cloud;
mod error;
mod orchestrator;
mod storage;

pub use cloud::{CloudAdapter, DocumentKind, DownloadedFile, LocalMirrorAdapter};
pub use error::{WorkflowError, WorkflowResult};
pub use orchestrator::{DocumentExtractor, Orchestrator, StartWorkflow};
pub use storage::{DocumentStore, StoredDocument};
