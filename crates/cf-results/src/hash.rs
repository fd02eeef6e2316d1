//! Content-based hashing for run IDs.

use crate::ResultsResult;
use cf_project::CaseFile;
use sha2::{Digest, Sha256};

/// SHA-256 over the serialized case and the solver version.
///
/// Identical inputs always map to the same id, so a rerun of an unchanged case
/// can be recognised from its manifest.
pub fn compute_run_id(case: &CaseFile, solver_version: &str) -> ResultsResult<String> {
    let mut hasher = Sha256::new();

    let case_json = serde_json::to_string(case)?;
    hasher.update(case_json.as_bytes());
    hasher.update(solver_version.as_bytes());

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}
