//! Pseudo-time relaxation of the coupled continuity / momentum system.
//!
//! Both schemes share the same node update: central differences for the
//! first and second derivatives, artificial-compressibility update of the
//! pressure, then explicit updates of `u` and `v` with the local time step.
//! They differ only in where the stencil reads from.
//!
//! - Symmetric Gauss-Seidel updates in place, so a node sees the values its
//!   predecessors in the sweep already wrote. A forward pass is followed by
//!   a backward pass, with the damping and wall values refreshed in between.
//! - Point Jacobi reads exclusively from the frozen previous state and writes
//!   the current one, so every column can be updated independently.

use crate::artificial_viscosity::ArtificialViscosity;
use crate::boundary::BoundaryConditions;
use crate::params::Parameters;
use cf_core::timing::{Timer, kernel_timing};
use cf_core::{Field2, Field3, NEQ, Real};
use rayon::prelude::*;

/// Relaxation strategy, selected once per run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RelaxationScheme {
    #[default]
    SymmetricGaussSeidel,
    PointJacobi,
}

impl RelaxationScheme {
    pub fn name(self) -> &'static str {
        match self {
            RelaxationScheme::SymmetricGaussSeidel => "symmetric Gauss-Seidel",
            RelaxationScheme::PointJacobi => "point Jacobi",
        }
    }

    /// Advance `state` by one pseudo-time iteration and re-impose the walls.
    ///
    /// On return `state.previous()` holds the field as it was on entry.
    pub fn iterate(
        self,
        state: &mut StatePair,
        visc: &mut ArtificialViscosity,
        ctx: &SweepContext<'_>,
        walls: &BoundaryConditions,
    ) {
        match self {
            RelaxationScheme::SymmetricGaussSeidel => {
                state.snapshot();

                visc.compute(&state.current, ctx.params);
                sweep(&mut state.current, visc, ctx, SweepDirection::Forward);
                walls.apply(&mut state.current);

                visc.compute(&state.current, ctx.params);
                sweep(&mut state.current, visc, ctx, SweepDirection::Backward);
                walls.apply(&mut state.current);
            }
            RelaxationScheme::PointJacobi => {
                state.swap();
                visc.compute(&state.previous, ctx.params);
                point_jacobi(&mut state.current, &state.previous, visc, ctx);
                walls.apply(&mut state.current);
            }
        }
    }
}

/// Current and previous solution, same shape.
#[derive(Clone, Debug)]
pub struct StatePair {
    current: Field3,
    previous: Field3,
}

impl StatePair {
    pub fn new(initial: Field3) -> Self {
        Self {
            previous: initial.clone(),
            current: initial,
        }
    }

    pub fn current(&self) -> &Field3 {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut Field3 {
        &mut self.current
    }

    pub fn previous(&self) -> &Field3 {
        &self.previous
    }

    /// Copy current into previous.
    pub fn snapshot(&mut self) {
        self.previous.clone_from(&self.current);
    }

    /// Exchange the two buffers without copying.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.previous);
    }

    pub fn into_current(self) -> Field3 {
        self.current
    }
}

/// Read-only per-iteration inputs shared by every node update.
#[derive(Clone, Copy)]
pub struct SweepContext<'a> {
    pub params: &'a Parameters,
    pub dt: &'a Field2,
    pub src: &'a Field3,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum SweepDirection {
    Forward,
    Backward,
}

/// Central-difference derivatives at one node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Derivatives {
    pub dpdx: Real,
    pub dpdy: Real,
    pub dudx: Real,
    pub dudy: Real,
    pub dvdx: Real,
    pub dvdy: Real,
    pub d2udx2: Real,
    pub d2udy2: Real,
    pub d2vdx2: Real,
    pub d2vdy2: Real,
}

impl Derivatives {
    /// Evaluate at interior node `(i, j)` of `f`.
    #[inline]
    pub fn at(f: &Field3, i: usize, j: usize, dx: Real, dy: Real) -> Self {
        let c = f[(i, j)];
        let (e, w) = (f[(i + 1, j)], f[(i - 1, j)]);
        let (n, s) = (f[(i, j + 1)], f[(i, j - 1)]);
        let (tdx, tdy) = (2.0 * dx, 2.0 * dy);
        let (dx2, dy2) = (dx * dx, dy * dy);
        Self {
            dpdx: (e[0] - w[0]) / tdx,
            dpdy: (n[0] - s[0]) / tdy,
            dudx: (e[1] - w[1]) / tdx,
            dudy: (n[1] - s[1]) / tdy,
            dvdx: (e[2] - w[2]) / tdx,
            dvdy: (n[2] - s[2]) / tdy,
            d2udx2: (e[1] - 2.0 * c[1] + w[1]) / dx2,
            d2udy2: (n[1] - 2.0 * c[1] + s[1]) / dy2,
            d2vdx2: (e[2] - 2.0 * c[2] + w[2]) / dx2,
            d2vdy2: (n[2] - 2.0 * c[2] + s[2]) / dy2,
        }
    }
}

/// Updated `[p, u, v]` at one node.
///
/// `node` supplies the values being relaxed and the velocity used for β².
/// When `coupled` is set, the y-momentum advection uses the freshly
/// updated `u`, as an in-place sweep would see it.
#[inline]
fn relax_node(
    node: [Real; NEQ],
    d: &Derivatives,
    visc: Real,
    dt: Real,
    src: [Real; NEQ],
    params: &Parameters,
    coupled: bool,
) -> [Real; NEQ] {
    let rho = params.flow.rho;
    let rhoinv = params.flow.rhoinv;
    let mu = params.flow.mu;
    let [p, u, v] = node;
    let beta2 = params.beta2(u, v);

    let continuity = rho * d.dudx + rho * d.dvdy - visc - src[0];
    let p_new = p - beta2 * dt * continuity;

    let xmom = rho * u * d.dudx + rho * v * d.dudy + d.dpdx - mu * d.d2udx2 - mu * d.d2udy2 - src[1];
    let u_new = u - dt * rhoinv * xmom;

    let ua = if coupled { u_new } else { u };
    let ymom = rho * ua * d.dvdx + rho * v * d.dvdy + d.dpdy - mu * d.d2vdx2 - mu * d.d2vdy2 - src[2];
    let v_new = v - dt * rhoinv * ymom;

    [p_new, u_new, v_new]
}

fn sweep(f: &mut Field3, visc: &ArtificialViscosity, ctx: &SweepContext<'_>, dir: SweepDirection) {
    let timer = Timer::start("sweep");
    let (imax, jmax) = f.dims();
    match dir {
        SweepDirection::Forward => {
            for j in 1..jmax - 1 {
                for i in 1..imax - 1 {
                    relax_in_place(f, i, j, visc, ctx);
                }
            }
        }
        SweepDirection::Backward => {
            for j in (1..jmax - 1).rev() {
                for i in (1..imax - 1).rev() {
                    relax_in_place(f, i, j, visc, ctx);
                }
            }
        }
    }
    timer.stop_into(&kernel_timing::SWEEP);
}

#[inline]
fn relax_in_place(f: &mut Field3, i: usize, j: usize, visc: &ArtificialViscosity, ctx: &SweepContext<'_>) {
    let d = Derivatives::at(f, i, j, ctx.params.flow.dx, ctx.params.flow.dy);
    f[(i, j)] = relax_node(
        f[(i, j)],
        &d,
        visc.total(i, j),
        ctx.dt[(i, j)],
        ctx.src[(i, j)],
        ctx.params,
        true,
    );
}

fn point_jacobi(
    current: &mut Field3,
    previous: &Field3,
    visc: &ArtificialViscosity,
    ctx: &SweepContext<'_>,
) {
    let timer = Timer::start("sweep");
    let (imax, jmax) = previous.dims();
    let (dx, dy) = (ctx.params.flow.dx, ctx.params.flow.dy);

    current
        .nodes_mut()
        .par_chunks_mut(jmax)
        .enumerate()
        .filter(|(i, _)| *i >= 1 && *i < imax - 1)
        .for_each(|(i, column)| {
            for j in 1..jmax - 1 {
                let d = Derivatives::at(previous, i, j, dx, dy);
                column[j] = relax_node(
                    previous[(i, j)],
                    &d,
                    visc.total(i, j),
                    ctx.dt[(i, j)],
                    ctx.src[(i, j)],
                    ctx.params,
                    false,
                );
            }
        });
    timer.stop_into(&kernel_timing::SWEEP);
}
