//! Shared application service layer for cavityflow.
//!
//! Turns a case file into a solver run: loads and validates the case, builds
//! the solver configuration, wires the output writers to the driver and
//! reports progress to whichever front end is calling.

pub mod case_service;
pub mod error;
pub mod progress;
pub mod run_service;

// Re-export key types for convenience
pub use case_service::{CaseSummary, default_case, load_case, save_case, summarize, validate_case};
pub use error::{AppError, AppResult};
pub use progress::{IterationProgress, RunProgressEvent, RunStage};
pub use run_service::{
    RunOptions, RunRequest, RunResponse, RunTimingSummary, load_run, run_case,
    run_case_with_progress, solver_config,
};
