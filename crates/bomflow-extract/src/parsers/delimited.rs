//! Delimited text parser (CSV/TSV and column-aligned plain text).

use super::{looks_like_header, rows_to_candidates, ItemParser, TableData};
use crate::error::{ExtractError, ExtractResult};
use bomflow_core::CandidateItem;
use std::path::Path;

/// Parser for delimited item tables.
pub struct DelimitedParser;

impl DelimitedParser {
    /// Create a new delimited parser.
    pub fn new() -> Self {
        Self
    }

    fn delimiter_for(path: &Path, content: &str) -> Delimiter {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .as_deref()
        {
            Some("csv") => Delimiter::Comma,
            Some("tsv") => Delimiter::Tab,
            _ => {
                // Plain text: prefer tabs, then commas, then aligned columns
                if content.contains('\t') {
                    Delimiter::Tab
                } else if content.contains(',') {
                    Delimiter::Comma
                } else {
                    Delimiter::Spaces
                }
            }
        }
    }
}

impl Default for DelimitedParser {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Delimiter {
    Comma,
    Tab,
    Spaces,
}

/// Split one line into cells. Comma-delimited input honors double-quoted
/// fields; space-delimited input splits on runs of two or more spaces.
fn split_line(line: &str, delimiter: Delimiter) -> Vec<String> {
    match delimiter {
        Delimiter::Tab => line.split('\t').map(|c| c.to_string()).collect(),
        Delimiter::Spaces => line
            .split("  ")
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(|c| c.to_string())
            .collect(),
        Delimiter::Comma => {
            let mut cells = Vec::new();
            let mut current = String::new();
            let mut in_quotes = false;
            let mut chars = line.chars().peekable();

            while let Some(ch) = chars.next() {
                match ch {
                    '"' if in_quotes && chars.peek() == Some(&'"') => {
                        current.push('"');
                        chars.next();
                    }
                    '"' => in_quotes = !in_quotes,
                    ',' if !in_quotes => {
                        cells.push(std::mem::take(&mut current));
                    }
                    _ => current.push(ch),
                }
            }
            cells.push(current);
            cells
        }
    }
}

impl ItemParser for DelimitedParser {
    fn parse(&self, path: &Path) -> ExtractResult<Vec<CandidateItem>> {
        if !path.exists() {
            return Err(ExtractError::FileNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let delimiter = Self::delimiter_for(path, &content);

        let mut table = TableData::default();
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let cells = split_line(line, delimiter);
            if table.headers.is_none() && table.rows.is_empty() && looks_like_header(&cells) {
                table.headers = Some(cells);
                continue;
            }
            table.rows.push((idx + 1, cells));
        }

        Ok(rows_to_candidates(table))
    }

    fn extensions(&self) -> &[&str] {
        &["csv", "tsv", "txt"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_csv_with_header() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "Part Number,Description,Qty").unwrap();
        writeln!(file, "R100,10k resistor,4").unwrap();
        writeln!(file, "C200,\"ceramic cap, 0603\",10").unwrap();

        let parser = DelimitedParser::new();
        let candidates = parser.parse(file.path()).unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].identifier, "R100");
        assert_eq!(candidates[1].description, "ceramic cap, 0603");
        assert_eq!(candidates[1].quantity, Some(10.0));
    }

    #[test]
    fn test_parse_headerless_csv() {
        let mut file = NamedTempFile::with_suffix(".csv").unwrap();
        writeln!(file, "R100,10k resistor,4").unwrap();

        let parser = DelimitedParser::new();
        let candidates = parser.parse(file.path()).unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].identifier, "R100");
        assert_eq!(candidates[0].position, 1);
    }

    #[test]
    fn test_parse_tsv() {
        let mut file = NamedTempFile::with_suffix(".tsv").unwrap();
        writeln!(file, "Part\tDescription\tQty").unwrap();
        writeln!(file, "B77\tbracket\t2").unwrap();

        let parser = DelimitedParser::new();
        let candidates = parser.parse(file.path()).unwrap();

        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].identifier, "B77");
    }

    #[test]
    fn test_parse_aligned_text() {
        let mut file = NamedTempFile::with_suffix(".txt").unwrap();
        writeln!(file, "R100  10k resistor  4").unwrap();
        writeln!(file, "C200  ceramic cap   10").unwrap();

        let parser = DelimitedParser::new();
        let candidates = parser.parse(file.path()).unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].identifier, "R100");
        assert_eq!(candidates[1].description, "ceramic cap");
    }

    #[test]
    fn test_quoted_quotes() {
        assert_eq!(
            split_line(r#"A,"say ""hi""",1"#, Delimiter::Comma),
            vec!["A", r#"say "hi""#, "1"]
        );
    }
}
