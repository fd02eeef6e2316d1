//! Fourth-order pressure damping for the continuity equation.
//!
//! The five-point stencil needs two neighbours on each side, so it is
//! evaluated only where `2 <= i <= imax-3` and `2 <= j <= jmax-3`. The
//! remaining nodes are filled by linear extrapolation along the grid line,
//! first the ring next to the wall and then the wall ring itself.

use crate::params::{Parameters, wave_speed};
use cf_core::timing::{Timer, kernel_timing};
use cf_core::{Field2, Field3, GridGeometry, Real};

/// Smallest dimension with at least one stencil-capable node.
const MIN_STENCIL_NODES: usize = 5;

/// x- and y-direction damping terms, one scalar per node.
#[derive(Clone, Debug)]
pub struct ArtificialViscosity {
    x: Field2,
    y: Field2,
}

impl ArtificialViscosity {
    pub fn new(grid: &GridGeometry) -> Self {
        Self {
            x: Field2::for_grid(grid),
            y: Field2::for_grid(grid),
        }
    }

    pub fn x(&self) -> &Field2 {
        &self.x
    }

    pub fn y(&self) -> &Field2 {
        &self.y
    }

    /// Combined damping `viscx + viscy` entering the continuity residual.
    #[inline]
    pub fn total(&self, i: usize, j: usize) -> Real {
        self.x[(i, j)] + self.y[(i, j)]
    }

    /// Recompute both damping fields from the pressure and velocity in `field`.
    pub fn compute(&mut self, field: &Field3, params: &Parameters) {
        let timer = Timer::start("artificial viscosity");
        let (imax, jmax) = field.dims();
        if imax < MIN_STENCIL_NODES || jmax < MIN_STENCIL_NODES {
            self.x.fill(0.0);
            self.y.fill(0.0);
            timer.stop_into(&kernel_timing::ARTIFICIAL_VISCOSITY);
            return;
        }

        let (dx, dy) = (params.flow.dx, params.flow.dy);
        let (cx, cy) = (params.numerics.cx, params.numerics.cy);
        for j in 2..jmax - 2 {
            for i in 2..imax - 2 {
                let [_, u, v] = field[(i, j)];
                let beta2 = params.beta2(u, v);
                let lx = wave_speed(u, beta2);
                let ly = wave_speed(v, beta2);

                let d4pdx4 = (field.p(i + 2, j) - 4.0 * field.p(i + 1, j) + 6.0 * field.p(i, j)
                    - 4.0 * field.p(i - 1, j)
                    + field.p(i - 2, j))
                    / dx;
                let d4pdy4 = (field.p(i, j + 2) - 4.0 * field.p(i, j + 1) + 6.0 * field.p(i, j)
                    - 4.0 * field.p(i, j - 1)
                    + field.p(i, j - 2))
                    / dy;

                self.x[(i, j)] = -lx.abs() * cx * d4pdx4 / beta2;
                self.y[(i, j)] = -ly.abs() * cy * d4pdy4 / beta2;
            }
        }

        fill_edges(&mut self.x);
        fill_edges(&mut self.y);
        timer.stop_into(&kernel_timing::ARTIFICIAL_VISCOSITY);
    }
}

/// Outward projection from `near` through `far`, or a copy of `near` when
/// the line holds only one computed value.
#[inline]
fn project(near: Real, far: Real, single: bool) -> Real {
    if single { near } else { 2.0 * near - far }
}

/// Populate every node outside the stencil core. Requires `imax, jmax >= 5`.
fn fill_edges(f: &mut Field2) {
    let (imax, jmax) = f.dims();
    let single_i = imax == MIN_STENCIL_NODES;
    let single_j = jmax == MIN_STENCIL_NODES;
    let (il, ir) = (1, imax - 2);
    let (jb, jt) = (1, jmax - 2);

    for j in 2..jmax - 2 {
        f[(il, j)] = project(f[(il + 1, j)], f[(il + 2, j)], single_i);
        f[(ir, j)] = project(f[(ir - 1, j)], f[(ir - 2, j)], single_i);
    }
    for i in 1..imax - 1 {
        f[(i, jb)] = project(f[(i, jb + 1)], f[(i, jb + 2)], single_j);
        f[(i, jt)] = project(f[(i, jt - 1)], f[(i, jt - 2)], single_j);
    }

    let (ir, jt) = (imax - 1, jmax - 1);
    for j in 1..jmax - 1 {
        f[(0, j)] = project(f[(1, j)], f[(2, j)], false);
        f[(ir, j)] = project(f[(ir - 1, j)], f[(ir - 2, j)], false);
    }
    for i in 0..imax {
        f[(i, 0)] = project(f[(i, 1)], f[(i, 2)], false);
        f[(i, jt)] = project(f[(i, jt - 1)], f[(i, jt - 2)], false);
    }
}
