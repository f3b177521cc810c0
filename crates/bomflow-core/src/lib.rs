//! Bomflow Core - Domain types for the BOM processing engine.

mod types;

pub use types::*;
