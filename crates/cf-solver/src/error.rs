//! Error types for solver operations.

use cf_core::error::CfError;
use thiserror::Error;

/// Errors that can occur while setting up or driving a run.
///
/// Numerical divergence is deliberately not an error: it is reported through
/// [`crate::SolveStatus::Diverged`] together with the raw residuals.
#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: String },

    #[error("Restart state rejected: {what}")]
    Restart { what: String },

    #[error("Observer failed: {what}")]
    Observer { what: String },

    #[error("Core error: {0}")]
    Core(#[from] CfError),
}

pub type SolverResult<T> = Result<T, SolverError>;

impl SolverError {
    pub(crate) fn config(what: impl Into<String>) -> Self {
        SolverError::InvalidConfig { what: what.into() }
    }
}

impl From<SolverError> for CfError {
    fn from(e: SolverError) -> Self {
        match e {
            SolverError::InvalidConfig { what: _ } => CfError::InvalidArg {
                what: "solver configuration",
            },
            SolverError::Restart { what: _ } => CfError::InvalidArg {
                what: "restart state",
            },
            SolverError::Observer { what: _ } => CfError::Invariant {
                what: "observer failed",
            },
            SolverError::Core(inner) => inner,
        }
    }
}
