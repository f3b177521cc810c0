//! Error types for the extraction pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;

/// Errors that can occur during extraction.
///
/// Extraction never silently yields an empty result: corrupt or empty
/// input surfaces as one of these variants.
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Unsupported document format: {0}")]
    UnsupportedFormat(String),

    #[error("Document is empty: {0}")]
    EmptyDocument(String),

    #[error("Unparsable document structure in {path}: {message}")]
    Unparsable { path: PathBuf, message: String },
}
