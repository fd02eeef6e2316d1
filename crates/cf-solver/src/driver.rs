//! Pseudo-time driver: owns the run state and marches it to steady state.
//!
//! One iteration is time step → relaxation → pressure rescale → time update
//! → convergence check. Reports and field snapshots are handed to an
//! [`IterationObserver`], which is where persistence lives.

use crate::artificial_viscosity::ArtificialViscosity;
use crate::boundary::{BoundaryConditions, BoundaryKind};
use crate::convergence::{ConvergenceMonitor, Residuals, iterative_residuals};
use crate::error::{SolverError, SolverResult};
use crate::error_norms::DiscretizationErrors;
use crate::manufactured::{AnalyticSolution, ManufacturedSolution, source_field};
use crate::params::{Parameters, SolverConfig};
use crate::relaxation::{StatePair, SweepContext};
use crate::rescale::PressureAnchor;
use crate::time_step::compute_time_step;
use cf_core::{Field2, Field3, GridGeometry, NEQ, Real};
use tracing::{debug, info, warn};

/// State restored from a checkpoint.
#[derive(Clone, Debug)]
pub struct RestartState {
    /// Last iteration completed by the previous run
    pub iteration: usize,
    pub time: Real,
    pub initial_residuals: [Real; NEQ],
    pub field: Field3,
}

/// Where the iteration starts from.
#[derive(Clone, Debug, Default)]
pub enum StartFrom {
    #[default]
    Fresh,
    Restart(RestartState),
}

/// Result of a single iteration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IterationReport {
    pub iteration: usize,
    /// Accumulated pseudo-time after this iteration
    pub time: Real,
    pub dt_min: Real,
    pub residuals: Residuals,
    pub ratio: Real,
    /// Uniform offset removed from the pressure by the rescale step
    pub pressure_shift: Real,
    /// The stopping test fired on this iteration.
    pub stop: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SnapshotKind {
    /// Before the first iteration
    Initial,
    /// Every `solution` interval
    Periodic,
    /// After the loop ends
    Final,
}

/// Borrowed view of the solver state handed to observers.
pub struct Snapshot<'a> {
    pub kind: SnapshotKind,
    /// Last completed iteration
    pub iteration: usize,
    pub time: Real,
    pub initial_residuals: [Real; NEQ],
    pub grid: &'a GridGeometry,
    pub field: &'a Field3,
    /// Present in manufactured-solution runs
    pub exact: Option<&'a dyn AnalyticSolution>,
}

/// Receives residual reports and field snapshots during [`CavitySolver::run`].
pub trait IterationObserver {
    fn on_residuals(&mut self, _report: &IterationReport) -> SolverResult<()> {
        Ok(())
    }

    fn on_snapshot(&mut self, _snapshot: &Snapshot<'_>) -> SolverResult<()> {
        Ok(())
    }
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl IterationObserver for NoopObserver {}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolveStatus {
    /// Convergence ratio dropped below tolerance
    Converged,
    /// A residual became NaN or infinite
    Diverged,
    /// Iteration budget exhausted first
    MaxIterations,
}

impl SolveStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            SolveStatus::Converged => "converged",
            SolveStatus::Diverged => "diverged",
            SolveStatus::MaxIterations => "max_iterations",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SolveSummary {
    pub status: SolveStatus,
    /// Last iteration executed (equal to the restart point if none ran)
    pub iterations: usize,
    pub time: Real,
    pub residuals: Residuals,
    /// `None` when no iteration ran
    pub ratio: Option<Real>,
    pub initial_residuals: Option<[Real; NEQ]>,
    /// Manufactured-solution runs only
    pub error_norms: Option<DiscretizationErrors>,
}

/// Lid-driven cavity solver.
pub struct CavitySolver {
    config: SolverConfig,
    params: Parameters,
    walls: BoundaryConditions,
    anchor: PressureAnchor,
    solution: Option<ManufacturedSolution>,
    src: Field3,
    dt: Field2,
    visc: ArtificialViscosity,
    state: StatePair,
    monitor: ConvergenceMonitor,
    first_iteration: usize,
    next_iteration: usize,
    time: Real,
}

impl CavitySolver {
    pub fn new(config: SolverConfig, start: StartFrom) -> SolverResult<Self> {
        config.validate()?;
        let grid = config.grid;
        let params = Parameters::new(&config);
        let tolerance = params.numerics.tolerance;

        let (solution, walls, anchor) = match config.boundary {
            BoundaryKind::Cavity => (
                None,
                BoundaryConditions::cavity(params.flow.lid_velocity),
                PressureAnchor::reference(&grid, params.flow.reference_pressure),
            ),
            BoundaryKind::Manufactured => {
                let mms = ManufacturedSolution::new(&params.flow);
                (
                    Some(mms),
                    BoundaryConditions::manufactured(&grid, &mms),
                    PressureAnchor::exact(&grid, &mms),
                )
            }
        };
        let src = source_field(&grid, solution.as_ref().map(|s| s as &dyn AnalyticSolution));

        let (mut field, first_iteration, time, monitor) = match start {
            StartFrom::Fresh => (
                initial_field(&grid, &params),
                1,
                0.0,
                ConvergenceMonitor::new(grid.node_count(), tolerance),
            ),
            StartFrom::Restart(restart) => {
                if restart.field.dims() != (grid.imax, grid.jmax) {
                    let (imax, jmax) = restart.field.dims();
                    return Err(SolverError::Restart {
                        what: format!(
                            "checkpoint is {imax}x{jmax} but the grid is {}x{}",
                            grid.imax, grid.jmax
                        ),
                    });
                }
                if !restart.field.is_finite() || !restart.time.is_finite() {
                    return Err(SolverError::Restart {
                        what: "checkpoint contains non-finite values".into(),
                    });
                }
                info!(iteration = restart.iteration + 1, "restarting");
                // An iteration-0 checkpoint predates the first residuals.
                let monitor = if restart.iteration == 0 {
                    ConvergenceMonitor::new(grid.node_count(), tolerance)
                } else {
                    ConvergenceMonitor::resumed(
                        grid.node_count(),
                        tolerance,
                        restart.initial_residuals,
                    )
                };
                (restart.field, restart.iteration + 1, restart.time, monitor)
            }
        };
        walls.apply(&mut field);

        Ok(Self {
            params,
            walls,
            anchor,
            solution,
            src,
            dt: Field2::for_grid(&grid),
            visc: ArtificialViscosity::new(&grid),
            state: StatePair::new(field),
            monitor,
            first_iteration,
            next_iteration: first_iteration,
            time,
            config,
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn grid(&self) -> &GridGeometry {
        &self.config.grid
    }

    pub fn params(&self) -> &Parameters {
        &self.params
    }

    pub fn field(&self) -> &Field3 {
        self.state.current()
    }

    pub fn source(&self) -> &Field3 {
        &self.src
    }

    pub fn time(&self) -> Real {
        self.time
    }

    /// Number of the next iteration [`step`](Self::step) will execute.
    pub fn next_iteration(&self) -> usize {
        self.next_iteration
    }

    pub fn initial_residuals(&self) -> Option<[Real; NEQ]> {
        self.monitor.initial()
    }

    pub fn manufactured(&self) -> Option<&dyn AnalyticSolution> {
        self.solution.as_ref().map(|s| s as &dyn AnalyticSolution)
    }

    /// Execute one iteration.
    pub fn step(&mut self) -> IterationReport {
        let iteration = self.next_iteration;
        let dt_min = compute_time_step(self.state.current(), &self.params, &mut self.dt);

        let ctx = SweepContext {
            params: &self.params,
            dt: &self.dt,
            src: &self.src,
        };
        self.config
            .relaxation
            .iterate(&mut self.state, &mut self.visc, &ctx, &self.walls);
        let pressure_shift = self.anchor.rescale(self.state.current_mut());
        self.time += dt_min;

        let residuals = iterative_residuals(
            self.state.current(),
            self.state.previous(),
            &self.dt,
            &self.params,
        );
        let check = self.monitor.check(residuals);
        self.next_iteration += 1;

        IterationReport {
            iteration,
            time: self.time,
            dt_min,
            residuals,
            ratio: check.ratio,
            pressure_shift,
            stop: check.stop,
        }
    }

    /// Borrow the current state as a snapshot of the given kind.
    pub fn snapshot(&self, kind: SnapshotKind) -> Snapshot<'_> {
        Snapshot {
            kind,
            iteration: self.next_iteration - 1,
            time: self.time,
            initial_residuals: self.monitor.initial().unwrap_or([1.0; NEQ]),
            grid: &self.config.grid,
            field: self.state.current(),
            exact: self.manufactured(),
        }
    }

    /// Discretization error norms of the current field, manufactured runs only.
    pub fn error_norms(&self) -> Option<DiscretizationErrors> {
        self.manufactured()
            .map(|mms| DiscretizationErrors::compute(self.state.current(), &self.config.grid, mms))
    }

    /// Iterate until the stopping test fires or `max_iterations` is reached.
    pub fn run(&mut self, observer: &mut dyn IterationObserver) -> SolverResult<SolveSummary> {
        let max_iterations = self.params.numerics.max_iterations;
        let intervals = self.config.intervals;
        let grid = self.config.grid;
        info!(
            scheme = self.config.relaxation.name(),
            boundary = ?self.config.boundary,
            imax = grid.imax,
            jmax = grid.jmax,
            first = self.first_iteration,
            max_iterations,
            "starting pseudo-time iteration"
        );

        observer.on_snapshot(&self.snapshot(SnapshotKind::Initial))?;

        let mut last: Option<IterationReport> = None;
        while self.next_iteration <= max_iterations {
            let report = self.step();
            let n = report.iteration;
            let scheduled = n % intervals.residual == 0 || n == self.first_iteration;
            if scheduled || report.stop {
                debug!(
                    iteration = n,
                    ratio = report.ratio,
                    continuity = report.residuals.0[0],
                    x_momentum = report.residuals.0[1],
                    y_momentum = report.residuals.0[2],
                );
                observer.on_residuals(&report)?;
            }
            last = Some(report);
            if report.stop {
                break;
            }
            if n % intervals.solution == 0 {
                observer.on_snapshot(&self.snapshot(SnapshotKind::Periodic))?;
            }
        }

        let status = match last {
            Some(r) if r.stop && r.residuals.is_finite() && r.ratio.is_finite() => {
                SolveStatus::Converged
            }
            Some(r) if r.stop => SolveStatus::Diverged,
            _ => SolveStatus::MaxIterations,
        };
        let error_norms = self.error_norms();
        let summary = SolveSummary {
            status,
            iterations: self.next_iteration - 1,
            time: self.time,
            residuals: last.map(|r| r.residuals).unwrap_or_default(),
            ratio: last.map(|r| r.ratio),
            initial_residuals: self.monitor.initial(),
            error_norms,
        };
        match status {
            SolveStatus::Converged => info!(
                iterations = summary.iterations,
                time = summary.time,
                "converged"
            ),
            SolveStatus::Diverged => warn!(
                iterations = summary.iterations,
                "solution diverged: non-finite residuals"
            ),
            SolveStatus::MaxIterations => warn!(
                max_iterations,
                "stopped at the iteration limit before converging"
            ),
        }
        if let Some(norms) = &summary.error_norms {
            info!(l2 = ?norms.l2, linf = ?norms.linf, "discretization error");
        }

        observer.on_snapshot(&self.snapshot(SnapshotKind::Final))?;
        Ok(summary)
    }
}

/// Reference pressure everywhere, fluid at rest, lid speed along the top row.
fn initial_field(grid: &GridGeometry, params: &Parameters) -> Field3 {
    let pref = params.flow.reference_pressure;
    let lid = params.flow.lid_velocity;
    let top = grid.jmax - 1;
    Field3::from_fn(grid.imax, grid.jmax, |_, j| {
        if j == top { [pref, lid, 0.0] } else { [pref, 0.0, 0.0] }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::test_support::{P_REF, cavity_config};
    use crate::relaxation::RelaxationScheme;

    #[derive(Default)]
    struct Recorder {
        residual_iterations: Vec<usize>,
        snapshots: Vec<(SnapshotKind, usize)>,
    }

    impl IterationObserver for Recorder {
        fn on_residuals(&mut self, report: &IterationReport) -> SolverResult<()> {
            self.residual_iterations.push(report.iteration);
            Ok(())
        }

        fn on_snapshot(&mut self, snapshot: &Snapshot<'_>) -> SolverResult<()> {
            self.snapshots.push((snapshot.kind, snapshot.iteration));
            Ok(())
        }
    }

    #[test]
    fn fresh_start_has_lid_and_reference_pressure() {
        let solver = CavitySolver::new(cavity_config(5), StartFrom::Fresh).unwrap();
        let f = solver.field();
        for i in 1..4 {
            assert_eq!(f.u(i, 4), 1.0);
            assert_eq!(f.v(i, 4), 0.0);
        }
        for (i, j) in [(0, 0), (0, 4), (4, 0), (4, 4)] {
            assert_eq!(f.u(i, j), 0.0);
            assert_eq!(f.v(i, j), 0.0);
        }
        assert_eq!(f.p(2, 2), P_REF);
        assert_eq!(solver.next_iteration(), 1);
        assert_eq!(solver.time(), 0.0);
        assert!(solver.initial_residuals().is_none());
        assert!(solver.source().nodes().iter().all(|n| *n == [0.0; NEQ]));
    }

    #[test]
    fn step_advances_counters_and_pins_pressure() {
        let mut solver = CavitySolver::new(cavity_config(9), StartFrom::Fresh).unwrap();
        let r1 = solver.step();
        assert_eq!(r1.iteration, 1);
        assert!(r1.time > 0.0);
        assert_eq!(r1.time, r1.dt_min);
        assert!(solver.initial_residuals().is_some());

        let r2 = solver.step();
        assert_eq!(r2.iteration, 2);
        assert!((r2.time - (r1.dt_min + r2.dt_min)).abs() < 1e-18);
        assert!((solver.field().p(4, 4) - P_REF).abs() < 1e-14);
    }

    #[test]
    fn run_reports_on_schedule() {
        let mut config = cavity_config(9);
        config.numerics.max_iterations = 25;
        config.intervals.residual = 10;
        config.intervals.solution = 20;
        let mut solver = CavitySolver::new(config, StartFrom::Fresh).unwrap();
        let mut rec = Recorder::default();
        let summary = solver.run(&mut rec).unwrap();

        assert_eq!(summary.status, SolveStatus::MaxIterations);
        assert_eq!(summary.iterations, 25);
        assert!(summary.error_norms.is_none());
        assert_eq!(rec.residual_iterations, vec![1, 10, 20]);
        assert_eq!(
            rec.snapshots,
            vec![
                (SnapshotKind::Initial, 0),
                (SnapshotKind::Periodic, 20),
                (SnapshotKind::Final, 25),
            ]
        );
    }

    #[test]
    fn loose_tolerance_converges_and_reports_last_iteration() {
        let mut config = cavity_config(9);
        config.numerics.tolerance = 0.5;
        config.numerics.max_iterations = 10_000;
        let mut solver = CavitySolver::new(config, StartFrom::Fresh).unwrap();
        let mut rec = Recorder::default();
        let summary = solver.run(&mut rec).unwrap();

        assert_eq!(summary.status, SolveStatus::Converged);
        assert!(summary.ratio.unwrap() < 0.5);
        assert_eq!(rec.residual_iterations.last(), Some(&summary.iterations));
        assert_eq!(rec.snapshots.last(), Some(&(SnapshotKind::Final, summary.iterations)));
    }

    #[test]
    fn exhausted_budget_runs_nothing() {
        let mut config = cavity_config(5);
        config.numerics.max_iterations = 0;
        let mut solver = CavitySolver::new(config, StartFrom::Fresh).unwrap();
        let summary = solver.run(&mut NoopObserver).unwrap();
        assert_eq!(summary.status, SolveStatus::MaxIterations);
        assert_eq!(summary.iterations, 0);
        assert!(summary.ratio.is_none());
    }

    #[test]
    fn restart_resumes_after_stored_iteration() {
        let config = cavity_config(7);
        let mut first = CavitySolver::new(config.clone(), StartFrom::Fresh).unwrap();
        for _ in 0..5 {
            first.step();
        }
        let restart = RestartState {
            iteration: 5,
            time: first.time(),
            initial_residuals: first.initial_residuals().unwrap(),
            field: first.field().clone(),
        };
        let mut resumed = CavitySolver::new(config, StartFrom::Restart(restart)).unwrap();
        assert_eq!(resumed.next_iteration(), 6);
        assert_eq!(resumed.initial_residuals(), first.initial_residuals());
        for i in 1..6 {
            for j in 1..6 {
                assert_eq!(resumed.field()[(i, j)], first.field()[(i, j)]);
            }
        }

        // Wall pressure is re-extrapolated on restart, so allow round-off.
        let a = first.step();
        let b = resumed.step();
        assert_eq!(a.iteration, 6);
        assert_eq!(b.iteration, 6);
        assert_eq!(a.time, b.time);
        for k in 0..NEQ {
            let (ra, rb) = (a.residuals.0[k], b.residuals.0[k]);
            assert!((ra - rb).abs() <= 1e-6 * ra.abs().max(1e-12), "channel {k}");
        }
    }

    #[test]
    fn restart_from_initial_snapshot_matches_fresh_run() {
        let config = cavity_config(9);
        let mut fresh = CavitySolver::new(config.clone(), StartFrom::Fresh).unwrap();
        let initial = fresh.snapshot(SnapshotKind::Initial);
        let restart = RestartState {
            iteration: initial.iteration,
            time: initial.time,
            initial_residuals: initial.initial_residuals,
            field: initial.field.clone(),
        };
        assert_eq!(restart.iteration, 0);
        assert_eq!(restart.initial_residuals, [1.0; NEQ]);

        let mut resumed = CavitySolver::new(config, StartFrom::Restart(restart)).unwrap();
        assert!(resumed.initial_residuals().is_none());
        for _ in 0..3 {
            let a = fresh.step();
            let b = resumed.step();
            assert_eq!(a.iteration, b.iteration);
            assert!((a.ratio - b.ratio).abs() <= 1e-9 * a.ratio.abs(), "{a:?} vs {b:?}");
        }
        assert_eq!(resumed.initial_residuals(), fresh.initial_residuals());
    }

    #[test]
    fn restart_rejects_wrong_grid() {
        let restart = RestartState {
            iteration: 3,
            time: 0.1,
            initial_residuals: [1.0; NEQ],
            field: Field3::new(5, 5),
        };
        let err = CavitySolver::new(cavity_config(7), StartFrom::Restart(restart))
            .err()
            .unwrap();
        assert!(matches!(err, SolverError::Restart { .. }));
    }

    #[test]
    fn manufactured_mode_has_sources_and_error_norms() {
        let mut config = cavity_config(9);
        config.boundary = BoundaryKind::Manufactured;
        config.relaxation = RelaxationScheme::PointJacobi;
        config.numerics.max_iterations = 3;
        let mut solver = CavitySolver::new(config, StartFrom::Fresh).unwrap();
        assert!(solver.manufactured().is_some());
        assert_ne!(solver.source()[(4, 4)], [0.0; NEQ]);

        let summary = solver.run(&mut NoopObserver).unwrap();
        let norms = summary.error_norms.unwrap();
        assert!(norms.linf.iter().all(|e| e.is_finite() && *e > 0.0));
    }

    #[test]
    fn invalid_config_is_rejected_before_any_work() {
        let mut config = cavity_config(5);
        config.numerics.cfl = -1.0;
        assert!(matches!(
            CavitySolver::new(config, StartFrom::Fresh),
            Err(SolverError::InvalidConfig { .. })
        ));
    }
}
