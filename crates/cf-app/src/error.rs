//! Error types for the cf-app service layer.

use std::path::PathBuf;

/// Application error type that wraps errors from the backend crates
/// and gives the CLI a single error to report.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Case error: {0}")]
    Case(String),

    #[error("Failed to read case file: {path}")]
    CaseFileRead {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Case validation failed: {0}")]
    Validation(String),

    #[error("Restart file not found: {path}")]
    RestartMissing { path: PathBuf },

    #[error("Solver error: {0}")]
    Solver(String),

    #[error("Results error: {0}")]
    Results(String),

    #[error("Run not found: {0}")]
    RunNotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cf-app operations.
pub type AppResult<T> = Result<T, AppError>;

// Conversions from backend error types
impl From<cf_project::ProjectError> for AppError {
    fn from(err: cf_project::ProjectError) -> Self {
        match err {
            cf_project::ProjectError::Validation(inner) => AppError::Validation(inner.to_string()),
            other => AppError::Case(other.to_string()),
        }
    }
}

impl From<cf_project::ValidationError> for AppError {
    fn from(err: cf_project::ValidationError) -> Self {
        AppError::Validation(err.to_string())
    }
}

impl From<cf_solver::SolverError> for AppError {
    fn from(err: cf_solver::SolverError) -> Self {
        AppError::Solver(err.to_string())
    }
}

impl From<cf_core::CfError> for AppError {
    fn from(err: cf_core::CfError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

impl From<cf_results::ResultsError> for AppError {
    fn from(err: cf_results::ResultsError) -> Self {
        match err {
            cf_results::ResultsError::RunNotFound { dir } => AppError::RunNotFound(dir),
            other => AppError::Results(other.to_string()),
        }
    }
}
