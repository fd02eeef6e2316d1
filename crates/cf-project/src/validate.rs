//! Case validation logic.

use crate::schema::{CaseFile, FlowDef, GridDef, LATEST_VERSION, NumericsDef, OutputDef};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },
}

pub fn validate_case(case: &CaseFile) -> Result<(), ValidationError> {
    if case.version == 0 || case.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: case.version,
        });
    }
    validate_grid(&case.grid)?;
    validate_flow(&case.flow)?;
    validate_numerics(&case.numerics)?;
    validate_output(&case.output)?;
    Ok(())
}

fn invalid(field: &str, value: impl ToString, reason: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn require_positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive"))
    }
}

fn validate_grid(grid: &GridDef) -> Result<(), ValidationError> {
    if grid.imax < 3 {
        return Err(invalid("grid.imax", grid.imax, "at least 3 nodes required"));
    }
    if grid.jmax < 3 {
        return Err(invalid("grid.jmax", grid.jmax, "at least 3 nodes required"));
    }
    require_positive("grid.xmax_m - grid.xmin_m", grid.xmax_m - grid.xmin_m)?;
    require_positive("grid.ymax_m - grid.ymin_m", grid.ymax_m - grid.ymin_m)?;
    Ok(())
}

fn validate_flow(flow: &FlowDef) -> Result<(), ValidationError> {
    require_positive("flow.density_kg_m3", flow.density_kg_m3)?;
    require_positive("flow.reynolds", flow.reynolds)?;
    if !flow.lid_velocity_m_s.is_finite() || flow.lid_velocity_m_s == 0.0 {
        return Err(invalid(
            "flow.lid_velocity_m_s",
            flow.lid_velocity_m_s,
            "must be finite and non-zero",
        ));
    }
    if !flow.reference_pressure_pa.is_finite() {
        return Err(invalid(
            "flow.reference_pressure_pa",
            flow.reference_pressure_pa,
            "must be finite",
        ));
    }
    Ok(())
}

fn validate_numerics(numerics: &NumericsDef) -> Result<(), ValidationError> {
    require_positive("numerics.cfl", numerics.cfl)?;
    require_positive("numerics.kappa", numerics.kappa)?;
    require_positive("numerics.tolerance", numerics.tolerance)?;
    for (field, value) in [("numerics.cx", numerics.cx), ("numerics.cy", numerics.cy)] {
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(field, value, "must be non-negative"));
        }
    }
    Ok(())
}

fn validate_output(output: &OutputDef) -> Result<(), ValidationError> {
    if output.solution_interval == 0 {
        return Err(invalid("output.solution_interval", 0, "must be at least 1"));
    }
    if output.residual_interval == 0 {
        return Err(invalid("output.residual_interval", 0, "must be at least 1"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_case_is_valid() {
        validate_case(&CaseFile::new("default")).unwrap();
        validate_case(&CaseFile::manufactured("mms")).unwrap();
    }

    #[test]
    fn rejects_tiny_grid() {
        let mut case = CaseFile::new("tiny");
        case.grid.jmax = 2;
        let err = validate_case(&case).unwrap_err();
        assert!(err.to_string().contains("grid.jmax"));
    }

    #[test]
    fn rejects_zero_lid_and_negative_damping() {
        let mut case = CaseFile::new("lid");
        case.flow.lid_velocity_m_s = 0.0;
        assert!(validate_case(&case).is_err());

        let mut case = CaseFile::new("damping");
        case.numerics.cy = -0.1;
        assert!(validate_case(&case).is_err());
    }

    #[test]
    fn rejects_future_version() {
        let mut case = CaseFile::new("future");
        case.version = LATEST_VERSION + 1;
        assert!(matches!(
            validate_case(&case),
            Err(ValidationError::UnsupportedVersion { .. })
        ));
    }

    #[test]
    fn rejects_inverted_domain() {
        let mut case = CaseFile::new("inverted");
        case.grid.xmin_m = 1.0;
        assert!(validate_case(&case).is_err());
    }
}
