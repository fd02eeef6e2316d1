//! Case loading, saving, validation and summaries.

use cf_project::{BoundaryDef, CaseFile, RelaxationDef};
use std::path::Path;

use crate::error::{AppError, AppResult};

/// One-line description of a case for listings.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseSummary {
    pub name: String,
    pub imax: usize,
    pub jmax: usize,
    pub relaxation: &'static str,
    pub boundary: &'static str,
    pub reynolds: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
}

/// Load and validate a case file (`.yaml`, `.yml` or `.json`).
pub fn load_case(path: &Path) -> AppResult<CaseFile> {
    if !path.exists() {
        return Err(AppError::CaseFileRead {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        });
    }
    Ok(cf_project::load_case(path)?)
}

/// Validate and write a case file; the format follows the extension.
pub fn save_case(path: &Path, case: &CaseFile) -> AppResult<()> {
    cf_project::save_case(path, case)?;
    Ok(())
}

pub fn validate_case(case: &CaseFile) -> AppResult<()> {
    cf_project::validate_case(case)?;
    Ok(())
}

/// Case with default inputs, optionally switched to the manufactured solution.
pub fn default_case(name: &str, manufactured: bool) -> CaseFile {
    if manufactured {
        CaseFile::manufactured(name)
    } else {
        CaseFile::new(name)
    }
}

pub fn relaxation_name(def: RelaxationDef) -> &'static str {
    match def {
        RelaxationDef::SymmetricGaussSeidel => "symmetric_gauss_seidel",
        RelaxationDef::PointJacobi => "point_jacobi",
    }
}

pub fn boundary_name(def: BoundaryDef) -> &'static str {
    match def {
        BoundaryDef::Cavity => "cavity",
        BoundaryDef::Manufactured => "manufactured",
    }
}

pub fn summarize(case: &CaseFile) -> CaseSummary {
    CaseSummary {
        name: case.name.clone(),
        imax: case.grid.imax,
        jmax: case.grid.jmax,
        relaxation: relaxation_name(case.relaxation),
        boundary: boundary_name(case.boundary),
        reynolds: case.flow.reynolds,
        tolerance: case.numerics.tolerance,
        max_iterations: case.numerics.max_iterations,
    }
}
