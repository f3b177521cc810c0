//! PDF document parser.

use super::{looks_like_header, rows_to_candidates, ItemParser, TableData};
use crate::error::{ExtractError, ExtractResult};
use bomflow_core::CandidateItem;
use std::path::Path;
use tracing::debug;

/// Parser for PDF WI/QC documents.
///
/// PDF text extraction loses table structure, so rows are recovered from
/// lines whose cells are separated by tabs or runs of two or more spaces.
pub struct PdfParser;

impl PdfParser {
    /// Create a new PDF parser.
    pub fn new() -> Self {
        Self
    }
}

impl Default for PdfParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemParser for PdfParser {
    fn parse(&self, path: &Path) -> ExtractResult<Vec<CandidateItem>> {
        if !path.exists() {
            return Err(ExtractError::FileNotFound(path.to_path_buf()));
        }

        debug!("Parsing PDF: {:?}", path);

        let content =
            pdf_extract::extract_text(path).map_err(|e| ExtractError::Unparsable {
                path: path.to_path_buf(),
                message: format!("Failed to extract text from PDF: {}", e),
            })?;

        let mut table = TableData::default();
        for (idx, line) in content.lines().enumerate() {
            let line = line.trim_end();
            if line.trim().is_empty() {
                continue;
            }

            let cells: Vec<String> = if line.contains('\t') {
                line.split('\t').map(|c| c.trim().to_string()).collect()
            } else {
                line.split("  ")
                    .map(|c| c.trim())
                    .filter(|c| !c.is_empty())
                    .map(|c| c.to_string())
                    .collect()
            };

            // Prose lines without column separation are not item rows
            if cells.len() < 2 {
                continue;
            }

            if table.headers.is_none() && table.rows.is_empty() && looks_like_header(&cells) {
                table.headers = Some(cells);
                continue;
            }
            table.rows.push((idx + 1, cells));
        }

        debug!(
            "Recovered {} item rows from {} characters of PDF text",
            table.rows.len(),
            content.len()
        );

        Ok(rows_to_candidates(table))
    }

    fn extensions(&self) -> &[&str] {
        &["pdf"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_parser_extensions() {
        let parser = PdfParser::new();
        assert!(parser.supports("pdf"));
        assert!(parser.supports("PDF"));
        assert!(!parser.supports("csv"));
    }

    #[test]
    fn test_missing_file() {
        let parser = PdfParser::new();
        let err = parser.parse(Path::new("/nonexistent.pdf")).unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound(_)));
    }
}
