//! Database CRUD operations.

pub mod knowledge_base;
pub mod results;
pub mod stats;
pub mod workflows;
