//! Workflow error types.

use bomflow_db::DbError;
use bomflow_extract::ExtractError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("Workflow failed: {0}")]
    Failed(String),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractError),

    #[error("Database error: {0}")]
    Db(DbError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// Surface missing rows as the caller-facing NotFound rather than a
// database error.
impl From<DbError> for WorkflowError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => WorkflowError::NotFound(msg),
            other => WorkflowError::Db(other),
        }
    }
}

pub type WorkflowResult<T> = Result<T, WorkflowError>;
