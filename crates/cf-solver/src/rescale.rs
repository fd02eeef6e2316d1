//! Pressure level pinning.
//!
//! Only pressure gradients enter the momentum equations, so the level is
//! fixed by shifting the whole field until the centre node hits a target.

use crate::manufactured::AnalyticSolution;
use cf_core::{Channel, Field3, GridGeometry, Real};

/// Reference node and the pressure it is pinned to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PressureAnchor {
    pub i: usize,
    pub j: usize,
    pub target: Real,
}

impl PressureAnchor {
    /// Anchor at the grid centre with a fixed target pressure.
    pub fn reference(grid: &GridGeometry, pressure: Real) -> Self {
        let (i, j) = grid.center();
        Self { i, j, target: pressure }
    }

    /// Anchor at the grid centre, targeting the exact solution there.
    pub fn exact(grid: &GridGeometry, solution: &dyn AnalyticSolution) -> Self {
        let (i, j) = grid.center();
        Self {
            i,
            j,
            target: solution.exact(grid.x(i), grid.y(j), Channel::Pressure),
        }
    }

    /// Shift every pressure value so the anchor node equals `target`.
    /// Returns the shift that was subtracted.
    pub fn rescale(&self, field: &mut Field3) -> Real {
        let delta = field.p(self.i, self.j) - self.target;
        field.add_to_channel(Channel::Pressure, -delta);
        delta
    }
}
