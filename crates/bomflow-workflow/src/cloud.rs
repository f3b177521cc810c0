//! Cloud ingestion adapter.
//!
//! Batch submissions pull documents from a shared folder. The production
//! integration would talk to SharePoint or Drive; here the adapter is a
//! trait with a local-directory implementation standing in for the remote
//! share.

use crate::error::{WorkflowError, WorkflowResult};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// What kind of manufacturing document a retrieved file is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    WorkInstruction,
    QualityCheck,
}

impl DocumentKind {
    /// Short label used in derived workflow names.
    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::WorkInstruction => "WI",
            DocumentKind::QualityCheck => "QC",
        }
    }
}

/// A document retrieved from the shared folder, staged on local disk.
#[derive(Debug, Clone)]
pub struct DownloadedFile {
    pub name: String,
    pub path: PathBuf,
    pub kind: DocumentKind,
}

/// Source of batch documents.
pub trait CloudAdapter: Send + Sync {
    /// Retrieve the processable documents behind a shared-folder URL.
    fn download_files_from_url(&self, url: &str) -> WorkflowResult<Vec<DownloadedFile>>;
}

/// Adapter that reads from a local mirror directory instead of a real
/// cloud share. Files under a path component containing "qc" are treated
/// as quality check documents; everything else is a work instruction.
pub struct LocalMirrorAdapter {
    root: PathBuf,
}

impl LocalMirrorAdapter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl CloudAdapter for LocalMirrorAdapter {
    fn download_files_from_url(&self, url: &str) -> WorkflowResult<Vec<DownloadedFile>> {
        if !self.root.is_dir() {
            return Err(WorkflowError::Validation(format!(
                "mirror directory does not exist: {}",
                self.root.display()
            )));
        }

        debug!(
            "Resolving {} against local mirror {}",
            url,
            self.root.display()
        );

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).sort_by_file_name() {
            let entry = entry.map_err(std::io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }

            let extension = entry
                .path()
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("");
            if !bomflow_extract::is_supported_extension(extension) {
                debug!("Skipping unsupported file: {}", entry.path().display());
                continue;
            }

            files.push(DownloadedFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path().to_path_buf(),
                kind: classify(entry.path(), &self.root),
            });
        }

        Ok(files)
    }
}

fn classify(path: &Path, root: &Path) -> DocumentKind {
    let relative = path.strip_prefix(root).unwrap_or(path);
    let is_qc = relative
        .components()
        .any(|c| c.as_os_str().to_string_lossy().to_lowercase().contains("qc"));
    if is_qc {
        DocumentKind::QualityCheck
    } else {
        DocumentKind::WorkInstruction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mirror_classifies_by_directory() {
        let mirror = TempDir::new().unwrap();
        std::fs::create_dir_all(mirror.path().join("wi")).unwrap();
        std::fs::create_dir_all(mirror.path().join("qc")).unwrap();
        std::fs::write(mirror.path().join("wi/line3.csv"), "R100,res,1\n").unwrap();
        std::fs::write(mirror.path().join("qc/checks.csv"), "C200,cap,2\n").unwrap();
        std::fs::write(mirror.path().join("wi/notes.log"), "not a document").unwrap();

        let adapter = LocalMirrorAdapter::new(mirror.path());
        let files = adapter
            .download_files_from_url("https://example.sharepoint.com/folder")
            .unwrap();

        assert_eq!(files.len(), 2);
        let qc = files.iter().find(|f| f.name == "checks.csv").unwrap();
        assert_eq!(qc.kind, DocumentKind::QualityCheck);
        let wi = files.iter().find(|f| f.name == "line3.csv").unwrap();
        assert_eq!(wi.kind, DocumentKind::WorkInstruction);
    }

    #[test]
    fn test_missing_mirror_rejected() {
        let adapter = LocalMirrorAdapter::new("/nonexistent/mirror");
        let err = adapter.download_files_from_url("url").unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }
}
