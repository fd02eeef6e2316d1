//! Iterative residual norms and the stopping test.

use crate::params::Parameters;
use cf_core::timing::{Timer, kernel_timing};
use cf_core::{Channel, Field2, Field3, NEQ, Real};

/// Per-equation L2 norms of the pseudo-time rate of change, ordered
/// continuity, x-momentum, y-momentum.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Residuals(pub [Real; NEQ]);

impl Residuals {
    pub fn get(&self, channel: Channel) -> Real {
        self.0[channel.index()]
    }

    pub fn max(&self) -> Real {
        // NaN must propagate; f64::max would drop it.
        self.0.iter().copied().fold(0.0, |acc, r| if r.is_nan() || r > acc { r } else { acc })
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|r| r.is_finite())
    }
}

/// Residual norms between two consecutive states.
///
/// The continuity residual is `(p_new − p_old)/(−β²·dt)` with β² from the new
/// velocity; the momentum residuals are `−ρ·Δu/dt`. Sums run over interior
/// nodes and are normalised by the total node count.
pub fn iterative_residuals(
    current: &Field3,
    previous: &Field3,
    dt: &Field2,
    params: &Parameters,
) -> Residuals {
    let timer = Timer::start("convergence");
    let (imax, jmax) = current.dims();
    let rho = params.flow.rho;
    let mut sums = [0.0; NEQ];

    for i in 1..imax - 1 {
        for j in 1..jmax - 1 {
            let [p, u, v] = current[(i, j)];
            let [p0, u0, v0] = previous[(i, j)];
            let dt = dt[(i, j)];
            let beta2 = params.beta2(u, v);
            let local = [
                (p - p0) / (-beta2 * dt),
                -rho * (u - u0) / dt,
                -rho * (v - v0) / dt,
            ];
            for k in 0..NEQ {
                sums[k] += local[k] * local[k];
            }
        }
    }

    let n = (imax * jmax) as Real;
    timer.stop_into(&kernel_timing::CONVERGENCE);
    Residuals(sums.map(|s| (s / n).sqrt()))
}

/// Outcome of one convergence test.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConvergenceCheck {
    pub residuals: Residuals,
    /// `max(residuals) / L2(initial continuity residual)`
    pub ratio: Real,
    /// Ratio dropped below tolerance or is no longer finite.
    pub stop: bool,
}

/// Tracks the initial residuals and decides when to stop.
#[derive(Clone, Debug)]
pub struct ConvergenceMonitor {
    initial: Option<[Real; NEQ]>,
    node_count: usize,
    tolerance: Real,
}

impl ConvergenceMonitor {
    /// Fresh run: the initial residuals are taken from the first check.
    pub fn new(node_count: usize, tolerance: Real) -> Self {
        Self {
            initial: None,
            node_count,
            tolerance,
        }
    }

    /// Restarted run: the initial residuals come from the checkpoint.
    pub fn resumed(node_count: usize, tolerance: Real, initial: [Real; NEQ]) -> Self {
        Self {
            initial: Some(initial.map(usable_initial)),
            node_count,
            tolerance,
        }
    }

    /// Initial residuals, once known.
    pub fn initial(&self) -> Option<[Real; NEQ]> {
        self.initial
    }

    pub fn tolerance(&self) -> Real {
        self.tolerance
    }

    pub fn check(&mut self, residuals: Residuals) -> ConvergenceCheck {
        let initial = *self
            .initial
            .get_or_insert_with(|| residuals.0.map(usable_initial));
        let denom = (initial[0] * initial[0] / self.node_count as Real).sqrt();
        let ratio = residuals.max() / denom;
        ConvergenceCheck {
            residuals,
            ratio,
            stop: ratio < self.tolerance || !ratio.is_finite(),
        }
    }
}

fn usable_initial(r: Real) -> Real {
    if r.is_finite() && r != 0.0 { r } else { 1.0 }
}
