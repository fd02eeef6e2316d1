//! A checkpoint written mid-run resumes the solver exactly where it stopped.

use cf_core::GridGeometry;
use cf_core::units::{kgpm3, mps, pa};
use cf_results::{read_checkpoint, write_checkpoint};
use cf_solver::{
    BoundaryKind, CavitySolver, NumericalParameters, PhysicalInputs, RelaxationScheme,
    ReportIntervals, SnapshotKind, SolverConfig, StartFrom,
};

fn config(max_iterations: usize) -> SolverConfig {
    SolverConfig {
        grid: GridGeometry::new(9, 9, (0.0, 0.05), (0.0, 0.05)).unwrap(),
        physics: PhysicalInputs {
            density: kgpm3(1.0),
            lid_velocity: mps(1.0),
            reynolds: 10.0,
            reference_pressure: pa(0.801333844662),
        },
        numerics: NumericalParameters {
            max_iterations,
            ..NumericalParameters::default()
        },
        relaxation: RelaxationScheme::SymmetricGaussSeidel,
        boundary: BoundaryKind::Cavity,
        intervals: ReportIntervals::default(),
    }
}

#[test]
fn resumed_run_matches_uninterrupted_run() {
    let path = std::env::temp_dir().join(format!("cf_results_resume_{}.out", std::process::id()));

    let mut straight = CavitySolver::new(config(40), StartFrom::Fresh).unwrap();
    for _ in 0..40 {
        straight.step();
    }

    let mut first = CavitySolver::new(config(40), StartFrom::Fresh).unwrap();
    for _ in 0..20 {
        first.step();
    }
    write_checkpoint(&path, &first.snapshot(SnapshotKind::Periodic)).unwrap();

    let grid = *first.grid();
    let state = read_checkpoint(&path, &grid).unwrap();
    assert_eq!(state.iteration, 20);
    assert_eq!(state.field, *first.field());

    let mut resumed = CavitySolver::new(config(40), StartFrom::Restart(state)).unwrap();
    assert_eq!(resumed.next_iteration(), 21);
    for _ in 0..20 {
        resumed.step();
    }

    let diff = resumed.field().max_abs_diff(straight.field());
    // Walls are re-applied on restart, which may move the corners by round-off
    assert!(diff.iter().all(|d| *d < 1.0e-10), "diff = {diff:?}");
    assert!((resumed.time() - straight.time()).abs() <= 1.0e-12 * straight.time());

    let _ = std::fs::remove_file(&path);
}
