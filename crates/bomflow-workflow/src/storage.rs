//! Workflow-scoped document storage.

use sha2::{Digest, Sha256};
use std::fmt::Write as _;
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Stores submitted documents under a per-workflow directory, so that a
/// workflow's inputs survive until the workflow itself is deleted.
#[derive(Debug, Clone)]
pub struct DocumentStore {
    root: PathBuf,
}

/// A document copied into the store.
#[derive(Debug, Clone)]
pub struct StoredDocument {
    pub path: PathBuf,
    pub sha256: String,
}

impl DocumentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Copy a source file into the workflow's directory and record its
    /// content digest.
    pub fn store(&self, workflow_id: &str, source: &Path) -> io::Result<StoredDocument> {
        let name = source.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("not a file: {}", source.display()),
            )
        })?;

        let dir = self.root.join(workflow_id);
        std::fs::create_dir_all(&dir)?;

        let dest = dir.join(name);
        std::fs::copy(source, &dest)?;
        let sha256 = sha256_file(&dest)?;

        debug!("Stored {} (sha256 {})", dest.display(), sha256);
        Ok(StoredDocument { path: dest, sha256 })
    }

    /// Remove a workflow's directory and everything in it. Missing
    /// directories are fine.
    pub fn remove(&self, workflow_id: &str) -> io::Result<()> {
        let dir = self.root.join(workflow_id);
        if dir.exists() {
            std::fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}

fn sha256_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 8192];
    loop {
        let read = file.read(&mut buffer)?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(hex, "{:02x}", byte);
    }
    Ok(hex)
}
