//! Run-level error types
//!
//! Unit-scoped failures never surface here; they are recorded as
//! [`ExecutionOutcome`](crate::ExecutionOutcome) values instead.
use std::path::PathBuf;
use thiserror::Error;

pub type RunnerResult<T> = Result<T, RunnerError>;

#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("{executor} not found in PATH. Please install {executor}.")]
    ExecutorNotFound { executor: String },

    #[error("{executor} is installed but not working properly: {reason}")]
    ExecutorNotFunctional { executor: String, reason: String },

    #[error("Required tool '{tool}' not found in PATH")]
    RequiredToolMissing { tool: String },

    #[error("Failed to prepare log directory {path}: {error}")]
    LogDirectory {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("Failed to write report to {path}: {error}")]
    ReportWrite {
        path: PathBuf,
        error: std::io::Error,
    },

    #[error("Failed to start worker pool: {0}")]
    WorkerPool(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RunnerError {
    /// Create an executor-not-found error
    pub fn executor_not_found(executor: impl Into<String>) -> Self {
        Self::ExecutorNotFound {
            executor: executor.into(),
        }
    }

    /// Create a log directory error with path context
    pub fn log_directory(path: impl Into<PathBuf>, error: std::io::Error) -> Self {
        Self::LogDirectory {
            path: path.into(),
            error,
        }
    }
}
