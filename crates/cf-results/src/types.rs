//! Result data types.

use cf_solver::{DiscretizationErrors, SolveSummary};
use serde::{Deserialize, Serialize};

pub type RunId = String;

/// Summary of one solver run, stored as `run.json` next to the output files.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunManifest {
    pub run_id: RunId,
    pub case_name: String,
    pub timestamp: String,
    pub solver_version: String,
    pub relaxation: String,
    pub boundary: String,
    pub imax: usize,
    pub jmax: usize,
    pub outcome: RunOutcome,
}

/// How the run ended. Non-finite numbers are stored as `null`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunOutcome {
    pub status: String,
    pub iterations: usize,
    pub time_s: Option<f64>,
    pub residuals: [Option<f64>; 3],
    pub ratio: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_norms: Option<ErrorNormsRecord>,
}

/// Per-channel discretization errors (pressure, x-velocity, y-velocity).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorNormsRecord {
    pub l1: [f64; 3],
    pub l2: [f64; 3],
    pub linf: [f64; 3],
}

fn finite(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

impl From<&DiscretizationErrors> for ErrorNormsRecord {
    fn from(norms: &DiscretizationErrors) -> Self {
        Self {
            l1: norms.l1,
            l2: norms.l2,
            linf: norms.linf,
        }
    }
}

impl From<&SolveSummary> for RunOutcome {
    fn from(summary: &SolveSummary) -> Self {
        let r = summary.residuals.0;
        Self {
            status: summary.status.as_str().to_string(),
            iterations: summary.iterations,
            time_s: finite(summary.time),
            residuals: [finite(r[0]), finite(r[1]), finite(r[2])],
            ratio: summary.ratio.and_then(finite),
            error_norms: summary.error_norms.as_ref().map(ErrorNormsRecord::from),
        }
    }
}
