//! Format parsers for BOM-bearing documents.

mod delimited;
mod markdown;
mod pdf;

pub use delimited::DelimitedParser;
pub use markdown::MarkdownTableParser;
pub use pdf::PdfParser;

use crate::error::ExtractResult;
use crate::normalize::normalize_text;
use bomflow_core::CandidateItem;
use std::path::Path;

/// Trait for document parsers.
pub trait ItemParser: Send + Sync {
    /// Parse a file into raw candidate rows (provenance filled by the
    /// extractor).
    fn parse(&self, path: &Path) -> ExtractResult<Vec<CandidateItem>>;

    /// Get the supported file extensions.
    fn extensions(&self) -> &[&str];

    /// Check if this parser supports the given extension.
    fn supports(&self, extension: &str) -> bool {
        self.extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }
}

/// A tabular slice of a document before column mapping.
#[derive(Debug, Default)]
pub(crate) struct TableData {
    pub headers: Option<Vec<String>>,
    /// (1-based source position, cells)
    pub rows: Vec<(usize, Vec<String>)>,
}

const IDENTIFIER_HEADERS: &[&str] = &[
    "part number",
    "part no",
    "part",
    "item number",
    "item no",
    "item",
    "id",
    "identifier",
    "pn",
    "mpn",
];

const DESCRIPTION_HEADERS: &[&str] = &["description", "desc", "item description", "name"];

const QUANTITY_HEADERS: &[&str] = &["qty", "quantity", "qty per", "count"];

fn canonical_header(header: &str) -> String {
    normalize_text(header).to_lowercase().replace('_', " ")
}

fn find_column(headers: &[String], names: &[&str]) -> Option<usize> {
    headers
        .iter()
        .position(|h| names.contains(&canonical_header(h).as_str()))
}

/// Whether a raw row looks like a header row rather than data.
pub(crate) fn looks_like_header(cells: &[String]) -> bool {
    cells.iter().any(|c| {
        let c = canonical_header(c);
        IDENTIFIER_HEADERS.contains(&c.as_str())
            || DESCRIPTION_HEADERS.contains(&c.as_str())
            || QUANTITY_HEADERS.contains(&c.as_str())
    })
}

fn parse_quantity(cell: &str) -> Option<f64> {
    let cleaned = cell.replace(',', "");
    cleaned.trim().parse::<f64>().ok()
}

/// Map raw table rows onto candidate items.
///
/// With headers the identifier/description/quantity columns are located by
/// name and the remaining columns become free-text attributes; without
/// headers the first three columns are taken positionally.
pub(crate) fn rows_to_candidates(table: TableData) -> Vec<CandidateItem> {
    let (id_col, desc_col, qty_col) = match &table.headers {
        Some(headers) => (
            find_column(headers, IDENTIFIER_HEADERS).unwrap_or(0),
            find_column(headers, DESCRIPTION_HEADERS).unwrap_or(1),
            find_column(headers, QUANTITY_HEADERS),
        ),
        None => (0, 1, Some(2)),
    };

    let mut candidates = Vec::new();

    for (position, cells) in table.rows {
        let identifier = cells
            .get(id_col)
            .map(|c| normalize_text(c))
            .unwrap_or_default();
        let description = cells
            .get(desc_col)
            .map(|c| normalize_text(c))
            .unwrap_or_default();

        if identifier.is_empty() && description.is_empty() {
            continue;
        }

        let mut candidate = CandidateItem::new(identifier, description);
        candidate.position = position;

        if let Some(qty_col) = qty_col {
            if let Some(qty) = cells.get(qty_col).and_then(|c| parse_quantity(c)) {
                candidate.quantity = Some(qty);
            }
        }

        // Remaining headered columns carry free-text attributes
        if let Some(headers) = &table.headers {
            let mut attributes = serde_json::Map::new();
            for (idx, cell) in cells.iter().enumerate() {
                if idx == id_col || idx == desc_col || Some(idx) == qty_col {
                    continue;
                }
                let value = normalize_text(cell);
                if value.is_empty() {
                    continue;
                }
                if let Some(header) = headers.get(idx) {
                    attributes.insert(canonical_header(header), serde_json::json!(value));
                }
            }
            if !attributes.is_empty() {
                candidate.attributes = serde_json::Value::Object(attributes);
            }
        }

        candidates.push(candidate);
    }

    candidates
}

/// Get the parser for a file based on its extension, if any.
pub(crate) fn parser_for_extension(extension: &str) -> Option<Box<dyn ItemParser>> {
    let delimited = DelimitedParser::new();
    if delimited.supports(extension) {
        return Some(Box::new(delimited));
    }

    let markdown = MarkdownTableParser::new();
    if markdown.supports(extension) {
        return Some(Box::new(markdown));
    }

    let pdf = PdfParser::new();
    if pdf.supports(extension) {
        return Some(Box::new(pdf));
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(row: &[&str]) -> Vec<String> {
        row.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_headered_mapping() {
        let table = TableData {
            headers: Some(cells(&["Part Number", "Description", "Qty", "Supplier"])),
            rows: vec![(2, cells(&["R100", "10k resistor", "4", "Acme"]))],
        };

        let candidates = rows_to_candidates(table);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].identifier, "R100");
        assert_eq!(candidates[0].description, "10k resistor");
        assert_eq!(candidates[0].quantity, Some(4.0));
        assert_eq!(candidates[0].attributes["supplier"], "Acme");
        assert_eq!(candidates[0].position, 2);
    }

    #[test]
    fn test_positional_mapping() {
        let table = TableData {
            headers: None,
            rows: vec![(1, cells(&["C200", "ceramic cap", "10"]))],
        };

        let candidates = rows_to_candidates(table);
        assert_eq!(candidates[0].identifier, "C200");
        assert_eq!(candidates[0].quantity, Some(10.0));
    }

    #[test]
    fn test_blank_rows_skipped() {
        let table = TableData {
            headers: None,
            rows: vec![(1, cells(&["", "", ""])), (2, cells(&["R1", "res", "1"]))],
        };

        let candidates = rows_to_candidates(table);
        assert_eq!(candidates.len(), 1);
    }

    #[test]
    fn test_header_detection() {
        assert!(looks_like_header(&cells(&["Part Number", "Description"])));
        assert!(looks_like_header(&cells(&["ITEM", "Name", "QTY"])));
        assert!(!looks_like_header(&cells(&["R100", "resistor", "2"])));
    }

    #[test]
    fn test_quantity_with_thousands_separator() {
        assert_eq!(parse_quantity("1,000"), Some(1000.0));
        assert_eq!(parse_quantity("4"), Some(4.0));
        assert_eq!(parse_quantity("n/a"), None);
    }
}
