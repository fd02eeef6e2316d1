//! Wall boundary conditions.
//!
//! Velocities are imposed on the outer ring of nodes; wall pressure is
//! extrapolated linearly from the two adjacent interior nodes.

use crate::manufactured::{AnalyticSolution, exact_field};
use cf_core::timing::{Timer, kernel_timing};
use cf_core::{Field3, GridGeometry, Real, extrapolate_linear};

/// Which boundary treatment a run uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BoundaryKind {
    /// No-slip walls with a sliding lid on top
    #[default]
    Cavity,
    /// Exact manufactured values on every wall
    Manufactured,
}

/// Boundary treatment, holding whatever data it needs across iterations.
#[derive(Clone, Debug)]
pub enum BoundaryConditions {
    Cavity { lid_velocity: Real },
    /// `exact` holds the manufactured solution at every node; only wall
    /// nodes are read.
    Manufactured { exact: Field3 },
}

impl BoundaryConditions {
    pub fn cavity(lid_velocity: Real) -> Self {
        BoundaryConditions::Cavity { lid_velocity }
    }

    pub fn manufactured(grid: &GridGeometry, solution: &dyn AnalyticSolution) -> Self {
        BoundaryConditions::Manufactured {
            exact: exact_field(grid, solution),
        }
    }

    pub fn kind(&self) -> BoundaryKind {
        match self {
            BoundaryConditions::Cavity { .. } => BoundaryKind::Cavity,
            BoundaryConditions::Manufactured { .. } => BoundaryKind::Manufactured,
        }
    }

    /// Overwrite the wall nodes of `field`. Interior nodes are read, never written.
    pub fn apply(&self, field: &mut Field3) {
        let timer = Timer::start("boundary");
        match self {
            BoundaryConditions::Cavity { lid_velocity } => apply_cavity(field, *lid_velocity),
            BoundaryConditions::Manufactured { exact } => apply_manufactured(field, exact),
        }
        timer.stop_into(&kernel_timing::BOUNDARY);
    }
}

fn apply_cavity(f: &mut Field3, lid: Real) {
    let (imax, jmax) = f.dims();
    let (il, ir) = (0, imax - 1);

    for j in 0..jmax {
        f[(il, j)][1] = 0.0;
        f[(il, j)][2] = 0.0;
        f[(ir, j)][1] = 0.0;
        f[(ir, j)][2] = 0.0;
        f[(ir, j)][0] = extrapolate_linear(f.p(ir - 1, j), f.p(ir - 2, j));
        f[(il, j)][0] = extrapolate_linear(f.p(il + 1, j), f.p(il + 2, j));
    }

    let jt = jmax - 1;
    for i in 1..imax - 1 {
        f[(i, 0)][1] = 0.0;
        f[(i, 0)][2] = 0.0;
        f[(i, 0)][0] = extrapolate_linear(f.p(i, 1), f.p(i, 2));

        f[(i, jt)][1] = lid;
        f[(i, jt)][2] = 0.0;
        f[(i, jt)][0] = extrapolate_linear(f.p(i, jt - 1), f.p(i, jt - 2));
    }
}

fn apply_manufactured(f: &mut Field3, exact: &Field3) {
    let (imax, jmax) = f.dims();
    debug_assert!(f.same_shape(exact));
    let (ir, jt) = (imax - 1, jmax - 1);

    for j in 1..jmax - 1 {
        f[(0, j)] = exact[(0, j)];
        f[(0, j)][0] = extrapolate_linear(f.p(1, j), f.p(2, j));
        f[(ir, j)] = exact[(ir, j)];
        f[(ir, j)][0] = extrapolate_linear(f.p(ir - 1, j), f.p(ir - 2, j));
    }

    for i in 0..imax {
        f[(i, 0)] = exact[(i, 0)];
        f[(i, 0)][0] = extrapolate_linear(f.p(i, 1), f.p(i, 2));
        f[(i, jt)] = exact[(i, jt)];
        f[(i, jt)][0] = extrapolate_linear(f.p(i, jt - 1), f.p(i, jt - 2));
    }
}
