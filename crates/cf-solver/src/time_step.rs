//! Local pseudo-time step.

use crate::params::{Parameters, wave_speed};
use cf_core::timing::{Timer, kernel_timing};
use cf_core::{Field2, Field3, Real};

/// Fill `dt` on interior nodes with `CFL · min(convective, viscous)` and
/// return the smallest value written. Wall nodes of `dt` are left as they are.
pub fn compute_time_step(field: &Field3, params: &Parameters, dt: &mut Field2) -> Real {
    let timer = Timer::start("time step");
    let (imax, jmax) = field.dims();
    let flow = &params.flow;
    let cfl = params.numerics.cfl;

    let h = flow.dx.min(flow.dy);
    let dt_visc = flow.dx * flow.dy / (4.0 * flow.nu());

    let mut dt_min = Real::INFINITY;
    for i in 1..imax - 1 {
        for j in 1..jmax - 1 {
            let [_, u, v] = field[(i, j)];
            let beta2 = params.beta2(u, v);
            let lambda = wave_speed(u, beta2).max(wave_speed(v, beta2));
            let local = cfl * (h / lambda).min(dt_visc);
            dt[(i, j)] = local;
            dt_min = dt_min.min(local);
        }
    }

    timer.stop_into(&kernel_timing::TIME_STEP);
    dt_min
}
