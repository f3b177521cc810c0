//! Bomflow DB - SQLite persistence for workflows, match results and the
//! knowledge base.

mod database;
mod error;
mod migrations;
mod operations;

pub use database::Database;
pub use error::{DbError, DbResult};
pub use operations::stats::DatabaseStats;
