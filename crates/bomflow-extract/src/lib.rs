//! Bomflow Extract - Document extraction pipeline.
//!
//! This crate turns uploaded WI/QC documents and item master spreadsheets
//! into normalized candidate item records:
//! - Format parsers (delimited text, markdown tables, PDF)
//! - Whitespace/artifact normalization and exact-duplicate removal

mod error;
mod extractor;
mod normalize;
mod parsers;

pub use error::{ExtractError, ExtractResult};
pub use extractor::{is_supported_extension, Extractor};
pub use normalize::normalize_text;
