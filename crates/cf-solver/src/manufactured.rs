//! Manufactured solution used to verify the discretization order.
//!
//! Each channel is
//! `φ(x, y) = φ0 + φx·f(ax·π·x/L) + φy·g(ay·π·y/L) + φxy·h(axy·π·x·y/L²)`
//! with `f`, `g`, `h` each a sine or a cosine. Source terms are the steady
//! residuals of the governing equations evaluated on that field, so the
//! discrete solution converges to `φ` as the grid is refined.

use crate::params::FlowParameters;
use cf_core::{Channel, Field3, GridGeometry, NEQ, Real};
use std::f64::consts::PI;

/// Exact field and matching forcing, evaluated pointwise.
pub trait AnalyticSolution: Send + Sync {
    fn exact(&self, x: Real, y: Real, channel: Channel) -> Real;

    /// Forcing `(mass, x-momentum, y-momentum)` at `(x, y)`.
    fn source(&self, x: Real, y: Real) -> [Real; NEQ];

    fn exact_node(&self, x: Real, y: Real) -> [Real; NEQ] {
        Channel::ALL.map(|c| self.exact(x, y, c))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Wave {
    Sin,
    Cos,
}

impl Wave {
    #[inline]
    fn value(self, arg: Real) -> Real {
        match self {
            Wave::Sin => arg.sin(),
            Wave::Cos => arg.cos(),
        }
    }

    #[inline]
    fn slope(self, arg: Real) -> Real {
        match self {
            Wave::Sin => arg.cos(),
            Wave::Cos => -arg.sin(),
        }
    }
}

/// Amplitudes, frequencies and wave shapes of one channel.
#[derive(Clone, Copy, Debug)]
struct Profile {
    phi0: Real,
    phix: Real,
    phiy: Real,
    phixy: Real,
    apx: Real,
    apy: Real,
    apxy: Real,
    wx: Wave,
    wy: Wave,
    wxy: Wave,
}

const PROFILES: [Profile; NEQ] = [
    Profile {
        phi0: 0.25,
        phix: 0.5,
        phiy: 0.4,
        phixy: 1.0 / 3.0,
        apx: 0.5,
        apy: 0.2,
        apxy: 2.0 / 7.0,
        wx: Wave::Cos,
        wy: Wave::Sin,
        wxy: Wave::Sin,
    },
    Profile {
        phi0: 0.3,
        phix: 0.15,
        phiy: 0.2,
        phixy: 0.25,
        apx: 1.0 / 3.0,
        apy: 0.25,
        apxy: 0.4,
        wx: Wave::Sin,
        wy: Wave::Cos,
        wxy: Wave::Sin,
    },
    Profile {
        phi0: 0.2,
        phix: 1.0 / 6.0,
        phiy: 0.25,
        phixy: 0.1,
        apx: 7.0 / 17.0,
        apy: 1.0 / 6.0,
        apxy: 1.0 / 3.0,
        wx: Wave::Cos,
        wy: Wave::Cos,
        wxy: Wave::Cos,
    },
];

/// Value and derivatives of one channel at a point.
#[derive(Clone, Copy, Debug, Default)]
struct Jet {
    value: Real,
    dx: Real,
    dy: Real,
    dxx: Real,
    dyy: Real,
}

impl Profile {
    fn jet(&self, x: Real, y: Real, length: Real) -> Jet {
        let kx = self.apx * PI / length;
        let ky = self.apy * PI / length;
        let kxy = self.apxy * PI / (length * length);
        let (ax, ay, axy) = (kx * x, ky * y, kxy * x * y);

        let fx = self.phix * self.wx.value(ax);
        let fy = self.phiy * self.wy.value(ay);
        let fxy = self.phixy * self.wxy.value(axy);
        let sxy = self.phixy * self.wxy.slope(axy);

        Jet {
            value: self.phi0 + fx + fy + fxy,
            dx: self.phix * kx * self.wx.slope(ax) + sxy * kxy * y,
            dy: self.phiy * ky * self.wy.slope(ay) + sxy * kxy * x,
            dxx: -fx * kx * kx - fxy * (kxy * y).powi(2),
            dyy: -fy * ky * ky - fxy * (kxy * x).powi(2),
        }
    }
}

/// The standard three-channel manufactured solution for the cavity.
#[derive(Clone, Copy, Debug)]
pub struct ManufacturedSolution {
    rho: Real,
    mu: Real,
    length: Real,
}

impl ManufacturedSolution {
    pub fn new(flow: &FlowParameters) -> Self {
        Self {
            rho: flow.rho,
            mu: flow.mu,
            length: flow.length,
        }
    }

    fn jets(&self, x: Real, y: Real) -> [Jet; NEQ] {
        PROFILES.map(|p| p.jet(x, y, self.length))
    }
}

impl AnalyticSolution for ManufacturedSolution {
    fn exact(&self, x: Real, y: Real, channel: Channel) -> Real {
        PROFILES[channel.index()].jet(x, y, self.length).value
    }

    fn source(&self, x: Real, y: Real) -> [Real; NEQ] {
        let [p, u, v] = self.jets(x, y);
        let rho = self.rho;
        [
            rho * u.dx + rho * v.dy,
            rho * u.value * u.dx + rho * v.value * u.dy + p.dx - self.mu * (u.dxx + u.dyy),
            rho * u.value * v.dx + rho * v.value * v.dy + p.dy - self.mu * (v.dxx + v.dyy),
        ]
    }
}

/// Evaluate the exact solution at every node.
pub fn exact_field(grid: &GridGeometry, solution: &dyn AnalyticSolution) -> Field3 {
    Field3::from_fn(grid.imax, grid.jmax, |i, j| {
        solution.exact_node(grid.x(i), grid.y(j))
    })
}

/// Forcing on interior nodes; zero on the boundary and when `solution` is `None`.
pub fn source_field(grid: &GridGeometry, solution: Option<&dyn AnalyticSolution>) -> Field3 {
    let mut src = Field3::for_grid(grid);
    if let Some(solution) = solution {
        for i in grid.interior_i() {
            for j in grid.interior_j() {
                src[(i, j)] = solution.source(grid.x(i), grid.y(j));
            }
        }
    }
    src
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::test_support::cavity_config;

    fn solution() -> ManufacturedSolution {
        let config = cavity_config(9);
        ManufacturedSolution::new(&FlowParameters::derive(&config.physics, &config.grid))
    }

    #[test]
    fn exact_values_at_origin() {
        let s = solution();
        // All sine terms vanish at the origin; cosines contribute their amplitude.
        assert!((s.exact(0.0, 0.0, Channel::Pressure) - 0.75).abs() < 1e-14);
        assert!((s.exact(0.0, 0.0, Channel::XVelocity) - 0.5).abs() < 1e-14);
        assert!((s.exact(0.0, 0.0, Channel::YVelocity) - (0.2 + 1.0 / 6.0 + 0.25 + 0.1)).abs() < 1e-14);
    }

    #[test]
    fn centre_pressure_is_close_to_cavity_reference() {
        let s = solution();
        let p = s.exact(0.025, 0.025, Channel::Pressure);
        assert!((p - 0.801333833).abs() < 1e-8, "p = {p}");
        assert!((p - crate::params::test_support::P_REF).abs() < 1e-7);
    }

    #[test]
    fn analytic_derivatives_match_finite_differences() {
        let s = solution();
        let (x, y, h) = (0.013, 0.031, 1e-6);
        for (k, profile) in PROFILES.iter().enumerate() {
            let jet = profile.jet(x, y, s.length);
            let c = Channel::ALL[k];
            let fd_dx = (s.exact(x + h, y, c) - s.exact(x - h, y, c)) / (2.0 * h);
            let fd_dy = (s.exact(x, y + h, c) - s.exact(x, y - h, c)) / (2.0 * h);
            assert!((jet.dx - fd_dx).abs() < 1e-5 * (1.0 + fd_dx.abs()));
            assert!((jet.dy - fd_dy).abs() < 1e-5 * (1.0 + fd_dy.abs()));

            let h2 = 1e-4;
            let fd_dxx = (s.exact(x + h2, y, c) - 2.0 * jet.value + s.exact(x - h2, y, c)) / (h2 * h2);
            assert!((jet.dxx - fd_dxx).abs() < 1e-3 * (1.0 + fd_dxx.abs()));
        }
    }

    #[test]
    fn source_is_zero_on_boundary_and_without_solution() {
        let grid = cavity_config(7).grid;
        let s = solution();
        let src = source_field(&grid, Some(&s));
        assert_eq!(src[(0, 3)], [0.0; NEQ]);
        assert_eq!(src[(3, 6)], [0.0; NEQ]);
        assert_ne!(src[(3, 3)], [0.0; NEQ]);

        let none = source_field(&grid, None);
        assert!(none.nodes().iter().all(|n| *n == [0.0; NEQ]));
    }
}
