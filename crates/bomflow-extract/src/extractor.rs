//! Main extraction logic.

use crate::error::{ExtractError, ExtractResult};
use crate::normalize::dedup_key;
use crate::parsers;
use bomflow_core::CandidateItem;
use std::collections::HashSet;
use std::path::Path;
use tracing::{debug, info};

/// Whether a file extension maps to a known document parser.
pub fn is_supported_extension(extension: &str) -> bool {
    parsers::parser_for_extension(extension).is_some()
}

/// Extracts normalized candidate items from stored documents.
#[derive(Debug, Clone, Default)]
pub struct Extractor;

impl Extractor {
    /// Create a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract candidate items from a document on disk.
    ///
    /// Fails loudly rather than returning an empty set: an empty file is
    /// `EmptyDocument`, a file with content but no recognizable item rows
    /// is `Unparsable`. Exact duplicate rows (same normalized identifier
    /// and description) are collapsed to their first occurrence.
    pub fn extract(&self, path: &Path) -> ExtractResult<Vec<CandidateItem>> {
        if !path.exists() {
            return Err(ExtractError::FileNotFound(path.to_path_buf()));
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();

        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let parser = parsers::parser_for_extension(extension)
            .ok_or_else(|| ExtractError::UnsupportedFormat(extension.to_string()))?;

        info!("Extracting items from: {}", file_name);

        if std::fs::metadata(path)?.len() == 0 {
            return Err(ExtractError::EmptyDocument(file_name));
        }

        let raw = parser.parse(path)?;
        if raw.is_empty() {
            return Err(ExtractError::Unparsable {
                path: path.to_path_buf(),
                message: "no item rows found".to_string(),
            });
        }

        let mut seen = HashSet::new();
        let mut candidates = Vec::with_capacity(raw.len());
        for mut candidate in raw {
            let key = dedup_key(&candidate.identifier, &candidate.description);
            if !seen.insert(key) {
                debug!(
                    "Dropping duplicate row {} ({})",
                    candidate.position, candidate.identifier
                );
                continue;
            }
            candidate.source_file = file_name.clone();
            candidates.push(candidate);
        }

        info!(
            "Extracted {} candidate items from {}",
            candidates.len(),
            file_name
        );

        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_extract_csv() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "Part Number,Description,Qty").unwrap();
        writeln!(file, "R100,10k resistor,4").unwrap();

        let extractor = Extractor::new();
        let candidates = extractor.extract(file.path()).unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].identifier, "R100");
        assert!(candidates[0].source_file.ends_with(".csv"));
    }

    #[test]
    fn test_duplicates_collapsed() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "R100,10k resistor,4").unwrap();
        writeln!(file, "R100,10k  Resistor,4").unwrap();
        writeln!(file, "C200,ceramic cap,1").unwrap();

        let extractor = Extractor::new();
        let candidates = extractor.extract(file.path()).unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].identifier, "R100");
        assert_eq!(candidates[1].identifier, "C200");
    }

    #[test]
    fn test_empty_document_rejected() {
        let file = NamedTempFile::with_suffix(".csv").unwrap();

        let extractor = Extractor::new();
        let err = extractor.extract(file.path()).unwrap_err();
        assert!(matches!(err, ExtractError::EmptyDocument(_)));
    }

    #[test]
    fn test_unsupported_format_rejected() {
        let mut file = NamedTempFile::with_suffix(".xyz").unwrap();
        writeln!(file, "whatever").unwrap();

        let extractor = Extractor::new();
        let err = extractor.extract(file.path()).unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_unparsable_structure_rejected() {
        let mut file = NamedTempFile::with_suffix(".md").unwrap();
        writeln!(file, "# Notes\n\nNo tables in this document.").unwrap();

        let extractor = Extractor::new();
        let err = extractor.extract(file.path()).unwrap_err();
        assert!(matches!(err, ExtractError::Unparsable { .. }));
    }
}
