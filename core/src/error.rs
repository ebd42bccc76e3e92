use crate::query::QueryError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a run before any worker is started.
#[derive(Debug, Error)]
pub enum AnalyzeError {
    #[error("source document not found: {}", .0.display())]
    SourceNotFound(PathBuf),
    #[error("failed to open {}: {message}", path.display())]
    Pdf { path: PathBuf, message: String },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("failed to start worker pool: {0}")]
    WorkerPool(String),
    #[error(transparent)]
    InvalidQuery(#[from] QueryError),
}
