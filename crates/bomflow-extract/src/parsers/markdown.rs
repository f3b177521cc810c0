//! Markdown table parser.

use super::{rows_to_candidates, ItemParser, TableData};
use crate::error::{ExtractError, ExtractResult};
use bomflow_core::CandidateItem;
use pulldown_cmark::{Event, Options, Parser, Tag};
use std::path::Path;

/// Parser for item tables embedded in Markdown documents.
///
/// WI documents often carry their BOM as one or more pipe tables; every
/// table in the document contributes rows.
pub struct MarkdownTableParser;

impl MarkdownTableParser {
    /// Create a new markdown table parser.
    pub fn new() -> Self {
        Self
    }

    fn extract_tables(&self, markdown: &str) -> Vec<TableData> {
        let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);

        let mut tables = Vec::new();
        let mut current: Option<TableData> = None;
        let mut in_head = false;
        let mut row_cells: Vec<String> = Vec::new();
        let mut cell_text = String::new();
        let mut in_cell = false;
        let mut position = 0usize;

        for event in parser {
            match event {
                Event::Start(Tag::Table(_)) => {
                    current = Some(TableData::default());
                }
                Event::End(Tag::Table(_)) => {
                    if let Some(table) = current.take() {
                        tables.push(table);
                    }
                }
                Event::Start(Tag::TableHead) => {
                    in_head = true;
                    row_cells.clear();
                }
                Event::End(Tag::TableHead) => {
                    in_head = false;
                    if let Some(table) = current.as_mut() {
                        table.headers = Some(std::mem::take(&mut row_cells));
                    }
                }
                Event::Start(Tag::TableRow) => {
                    row_cells.clear();
                }
                Event::End(Tag::TableRow) => {
                    position += 1;
                    if let Some(table) = current.as_mut() {
                        table.rows.push((position, std::mem::take(&mut row_cells)));
                    }
                }
                Event::Start(Tag::TableCell) => {
                    in_cell = true;
                    cell_text.clear();
                }
                Event::End(Tag::TableCell) => {
                    in_cell = false;
                    row_cells.push(std::mem::take(&mut cell_text));
                }
                Event::Text(t) | Event::Code(t) => {
                    if in_cell || in_head {
                        cell_text.push_str(&t);
                    }
                }
                _ => {}
            }
        }

        tables
    }
}

impl Default for MarkdownTableParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemParser for MarkdownTableParser {
    fn parse(&self, path: &Path) -> ExtractResult<Vec<CandidateItem>> {
        if !path.exists() {
            return Err(ExtractError::FileNotFound(path.to_path_buf()));
        }

        let content = std::fs::read_to_string(path)?;
        let tables = self.extract_tables(&content);

        let mut candidates = Vec::new();
        for table in tables {
            candidates.extend(rows_to_candidates(table));
        }

        Ok(candidates)
    }

    fn extensions(&self) -> &[&str] {
        &["md", "markdown"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_markdown_table() {
        let mut file = NamedTempFile::with_suffix(".md").unwrap();
        writeln!(
            file,
            r#"# Work Instruction 42

Fit the following parts:

| Part Number | Description | Qty |
|-------------|-------------|-----|
| R100        | 10k resistor | 4  |
| C200        | ceramic cap  | 10 |
"#
        )
        .unwrap();

        let parser = MarkdownTableParser::new();
        let candidates = parser.parse(file.path()).unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].identifier, "R100");
        assert_eq!(candidates[0].quantity, Some(4.0));
        assert_eq!(candidates[1].description, "ceramic cap");
    }

    #[test]
    fn test_multiple_tables_contribute() {
        let mut file = NamedTempFile::with_suffix(".md").unwrap();
        writeln!(
            file,
            r#"| Part | Description |
|------|-------------|
| A1   | first part  |

Some prose.

| Part | Description |
|------|-------------|
| B2   | second part |
"#
        )
        .unwrap();

        let parser = MarkdownTableParser::new();
        let candidates = parser.parse(file.path()).unwrap();

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[1].identifier, "B2");
    }

    #[test]
    fn test_document_without_tables() {
        let mut file = NamedTempFile::with_suffix(".md").unwrap();
        writeln!(file, "# Notes\n\nNo tables here.").unwrap();

        let parser = MarkdownTableParser::new();
        let candidates = parser.parse(file.path()).unwrap();
        assert!(candidates.is_empty());
    }
}
