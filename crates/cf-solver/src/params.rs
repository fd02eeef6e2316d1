//! Run parameters: user inputs and the constants derived from them once at startup.

use crate::boundary::BoundaryKind;
use crate::error::{SolverError, SolverResult};
use crate::relaxation::RelaxationScheme;
use cf_core::units::{Density, DynVisc, Pressure, Velocity, pa_s};
use cf_core::{GridGeometry, Real};

/// Physical inputs as the user states them.
#[derive(Clone, Copy, Debug)]
pub struct PhysicalInputs {
    pub density: Density,
    pub lid_velocity: Velocity,
    /// Reynolds number based on lid speed and cavity width
    pub reynolds: Real,
    /// Pressure level pinned at the reference node in cavity mode
    pub reference_pressure: Pressure,
}

/// Constants derived from [`PhysicalInputs`] and the grid.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlowParameters {
    pub rho: Real,
    pub rhoinv: Real,
    /// Characteristic length (cavity width)
    pub length: Real,
    /// Dynamic viscosity
    pub mu: Real,
    pub lid_velocity: Real,
    /// Reference velocity squared
    pub vel2ref: Real,
    pub dx: Real,
    pub dy: Real,
    pub reference_pressure: Real,
}

impl FlowParameters {
    /// Derive the flow constants. Pure computation; ranges are checked by
    /// [`SolverConfig::validate`].
    pub fn derive(inputs: &PhysicalInputs, grid: &GridGeometry) -> Self {
        let rho = inputs.density.value;
        let lid_velocity = inputs.lid_velocity.value;
        let length = grid.xmax - grid.xmin;
        Self {
            rho,
            rhoinv: 1.0 / rho,
            length,
            mu: rho * lid_velocity.abs() * length / inputs.reynolds,
            lid_velocity,
            vel2ref: lid_velocity * lid_velocity,
            dx: grid.dx(),
            dy: grid.dy(),
            reference_pressure: inputs.reference_pressure.value,
        }
    }

    pub fn viscosity(&self) -> DynVisc {
        pa_s(self.mu)
    }

    /// Kinematic viscosity `μ/ρ`.
    pub fn nu(&self) -> Real {
        self.mu * self.rhoinv
    }
}

/// Numerical controls of the pseudo-time iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NumericalParameters {
    pub cfl: Real,
    /// Fourth-order damping coefficient in x
    pub cx: Real,
    /// Fourth-order damping coefficient in y
    pub cy: Real,
    /// Time-derivative preconditioning constant
    pub kappa: Real,
    /// Convergence ratio below which the run stops
    pub tolerance: Real,
    /// Last iteration number that may be executed
    pub max_iterations: usize,
}

impl Default for NumericalParameters {
    fn default() -> Self {
        Self {
            cfl: 0.8,
            cx: 0.01,
            cy: 0.01,
            kappa: 0.1,
            tolerance: 1.0e-10,
            max_iterations: 1_000_000,
        }
    }
}

/// How often the driver hands data to its observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReportIntervals {
    /// Iterations between field snapshots
    pub solution: usize,
    /// Iterations between residual reports
    pub residual: usize,
}

impl Default for ReportIntervals {
    fn default() -> Self {
        Self {
            solution: 500,
            residual: 10,
        }
    }
}

/// Everything needed to construct a [`crate::CavitySolver`].
#[derive(Clone, Debug)]
pub struct SolverConfig {
    pub grid: GridGeometry,
    pub physics: PhysicalInputs,
    pub numerics: NumericalParameters,
    pub relaxation: RelaxationScheme,
    pub boundary: BoundaryKind,
    pub intervals: ReportIntervals,
}

impl SolverConfig {
    pub fn validate(&self) -> SolverResult<()> {
        let p = &self.physics;
        let n = &self.numerics;
        check(p.density.value > 0.0, "density must be positive")?;
        check(p.reynolds > 0.0, "Reynolds number must be positive")?;
        check(
            p.lid_velocity.value.is_finite() && p.lid_velocity.value != 0.0,
            "lid velocity must be finite and non-zero",
        )?;
        check(p.reference_pressure.value.is_finite(), "reference pressure must be finite")?;
        check(n.cfl > 0.0, "CFL number must be positive")?;
        check(n.cx >= 0.0 && n.cy >= 0.0, "damping coefficients must be non-negative")?;
        check(n.kappa > 0.0, "preconditioning constant must be positive")?;
        check(n.tolerance > 0.0, "convergence tolerance must be positive")?;
        check(
            self.intervals.solution > 0 && self.intervals.residual > 0,
            "output intervals must be at least one iteration",
        )?;
        Ok(())
    }
}

fn check(ok: bool, what: &str) -> SolverResult<()> {
    if ok {
        Ok(())
    } else {
        Err(SolverError::config(what))
    }
}

/// Immutable per-run constants handed by reference to every kernel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Parameters {
    pub flow: FlowParameters,
    pub numerics: NumericalParameters,
}

impl Parameters {
    pub fn new(config: &SolverConfig) -> Self {
        Self {
            flow: FlowParameters::derive(&config.physics, &config.grid),
            numerics: config.numerics,
        }
    }

    /// Local preconditioning parameter `β² = max(u² + v², κ·U_ref²)`.
    #[inline]
    pub fn beta2(&self, u: Real, v: Real) -> Real {
        (u * u + v * v).max(self.numerics.kappa * self.flow.vel2ref)
    }
}

/// Largest characteristic speed of the preconditioned system along one direction.
#[inline]
pub fn wave_speed(vel: Real, beta2: Real) -> Real {
    0.5 * (vel.abs() + (vel * vel + 4.0 * beta2).sqrt())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use cf_core::units::{kgpm3, mps, pa};

    pub const P_REF: Real = 0.801333844662;

    pub fn cavity_config(n: usize) -> SolverConfig {
        SolverConfig {
            grid: GridGeometry::new(n, n, (0.0, 0.05), (0.0, 0.05)).unwrap(),
            physics: PhysicalInputs {
                density: kgpm3(1.0),
                lid_velocity: mps(1.0),
                reynolds: 10.0,
                reference_pressure: pa(P_REF),
            },
            numerics: NumericalParameters::default(),
            relaxation: RelaxationScheme::SymmetricGaussSeidel,
            boundary: BoundaryKind::Cavity,
            intervals: ReportIntervals::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;
    use cf_core::units::mps;

    #[test]
    fn derived_constants_match_inputs() {
        let config = cavity_config(11);
        let flow = FlowParameters::derive(&config.physics, &config.grid);
        assert_eq!(flow.rhoinv, 1.0);
        assert!((flow.length - 0.05).abs() < 1e-15);
        assert!((flow.mu - 0.005).abs() < 1e-15);
        assert_eq!(flow.vel2ref, 1.0);
        assert!((flow.dx - 0.005).abs() < 1e-15);
        assert!((flow.dy - 0.005).abs() < 1e-15);
        assert!((flow.viscosity().value - 0.005).abs() < 1e-15);
        assert!((flow.nu() - 0.005).abs() < 1e-15);
    }

    #[test]
    fn beta2_has_preconditioning_floor() {
        let params = Parameters::new(&cavity_config(5));
        assert!((params.beta2(0.0, 0.0) - 0.1).abs() < 1e-15);
        assert_eq!(params.beta2(1.0, 1.0), 2.0);
    }

    #[test]
    fn wave_speed_at_rest_is_beta() {
        assert!((wave_speed(0.0, 0.25) - 0.5).abs() < 1e-15);
        assert!(wave_speed(-2.0, 0.1) > 2.0);
    }

    #[test]
    fn validate_rejects_zero_lid() {
        let mut config = cavity_config(5);
        config.physics.lid_velocity = mps(0.0);
        assert!(matches!(
            config.validate(),
            Err(SolverError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn validate_accepts_defaults() {
        cavity_config(5).validate().unwrap();
    }
}
