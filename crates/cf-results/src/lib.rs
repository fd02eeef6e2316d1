//! cf-results: residual history, field snapshots, restart checkpoints and run manifests.

pub mod checkpoint;
pub mod field;
pub mod hash;
pub mod history;
mod sci;
pub mod store;
pub mod types;

pub use checkpoint::{parse_checkpoint, read_checkpoint, write_checkpoint};
pub use field::FieldWriter;
pub use hash::compute_run_id;
pub use history::HistoryWriter;
pub use store::RunStore;
pub use types::*;

pub type ResultsResult<T> = Result<T, ResultsError>;

#[derive(thiserror::Error, Debug)]
pub enum ResultsError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Run not found in {dir}")]
    RunNotFound { dir: String },

    #[error("Malformed checkpoint at line {line}: {reason}")]
    MalformedCheckpoint { line: usize, reason: String },
}
