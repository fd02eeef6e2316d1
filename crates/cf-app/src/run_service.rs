//! Run execution: case file in, output directory with history, field,
//! checkpoint and manifest out.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::time::Instant;

use cf_core::GridGeometry;
use cf_core::units::{kgpm3, mps, pa};
use cf_project::{BoundaryDef, CaseFile, RelaxationDef};
use cf_results::{
    FieldWriter, HistoryWriter, ResultsError, RunManifest, RunOutcome, RunStore, read_checkpoint,
    write_checkpoint,
};
use cf_solver::{
    BoundaryKind, CavitySolver, IterationObserver, IterationReport, NumericalParameters,
    PhysicalInputs, RelaxationScheme, ReportIntervals, RestartState, Snapshot, SolveSummary,
    SolverConfig, SolverError, SolverResult, StartFrom,
};
use tracing::info;

use crate::case_service::{self, boundary_name, relaxation_name};
use crate::error::{AppError, AppResult};
use crate::progress::{IterationProgress, RunProgressEvent, RunStage};

/// Overrides applied on top of the case file.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub solver_version: String,
    pub output_dir: Option<PathBuf>,
    pub max_iterations: Option<usize>,
    /// Resume from this checkpoint instead of the case's `restart` entry
    pub restart: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            solver_version: env!("CARGO_PKG_VERSION").to_string(),
            output_dir: None,
            max_iterations: None,
            restart: None,
        }
    }
}

/// Request to execute a run.
pub struct RunRequest<'a> {
    pub case_path: &'a Path,
    pub options: RunOptions,
}

/// Wall-clock breakdown of a run.
#[derive(Debug, Clone, Default)]
pub struct RunTimingSummary {
    pub setup_time_s: f64,
    pub solve_time_s: f64,
    pub save_time_s: f64,
    pub total_time_s: f64,
    pub iterations_executed: usize,
}

/// Response from a run execution.
#[derive(Debug, Clone)]
pub struct RunResponse {
    pub run_id: String,
    pub output_dir: PathBuf,
    pub manifest: RunManifest,
    pub summary: SolveSummary,
    pub timing: RunTimingSummary,
}

fn emit_progress(
    progress_cb: &mut Option<&mut dyn FnMut(RunProgressEvent)>,
    stage: RunStage,
    started: Instant,
    message: Option<String>,
    iteration: Option<IterationProgress>,
) {
    if let Some(cb) = progress_cb.as_deref_mut() {
        cb(RunProgressEvent {
            stage,
            elapsed_wall_s: started.elapsed().as_secs_f64(),
            message,
            iteration,
        });
    }
}

/// Paths in a case file are relative to the case file's directory.
fn resolve(case_path: &Path, path: &Path) -> PathBuf {
    match case_path.parent() {
        Some(dir) if path.is_relative() => dir.join(path),
        _ => path.to_path_buf(),
    }
}

/// Apply command-line overrides and re-validate.
pub fn apply_overrides(mut case: CaseFile, options: &RunOptions) -> AppResult<CaseFile> {
    if let Some(max_iterations) = options.max_iterations {
        case.numerics.max_iterations = max_iterations;
    }
    if let Some(dir) = &options.output_dir {
        case.output.directory = dir.clone();
    }
    if let Some(path) = &options.restart {
        case.restart = Some(cf_project::RestartDef { path: path.clone() });
    }
    case_service::validate_case(&case)?;
    Ok(case)
}

/// Translate a validated case into the solver's configuration.
pub fn solver_config(case: &CaseFile) -> AppResult<SolverConfig> {
    let g = &case.grid;
    let grid = GridGeometry::new(g.imax, g.jmax, (g.xmin_m, g.xmax_m), (g.ymin_m, g.ymax_m))?;
    let n = &case.numerics;
    let config = SolverConfig {
        grid,
        physics: PhysicalInputs {
            density: kgpm3(case.flow.density_kg_m3),
            lid_velocity: mps(case.flow.lid_velocity_m_s),
            reynolds: case.flow.reynolds,
            reference_pressure: pa(case.flow.reference_pressure_pa),
        },
        numerics: NumericalParameters {
            cfl: n.cfl,
            cx: n.cx,
            cy: n.cy,
            kappa: n.kappa,
            tolerance: n.tolerance,
            max_iterations: n.max_iterations,
        },
        relaxation: match case.relaxation {
            RelaxationDef::SymmetricGaussSeidel => RelaxationScheme::SymmetricGaussSeidel,
            RelaxationDef::PointJacobi => RelaxationScheme::PointJacobi,
        },
        boundary: match case.boundary {
            BoundaryDef::Cavity => BoundaryKind::Cavity,
            BoundaryDef::Manufactured => BoundaryKind::Manufactured,
        },
        intervals: ReportIntervals {
            solution: case.output.solution_interval,
            residual: case.output.residual_interval,
        },
    };
    config.validate()?;
    Ok(config)
}

fn load_restart(path: &Path, grid: &GridGeometry) -> AppResult<RestartState> {
    if !path.exists() {
        return Err(AppError::RestartMissing {
            path: path.to_path_buf(),
        });
    }
    Ok(read_checkpoint(path, grid)?)
}

/// Streams reports and snapshots from the driver into the output files.
struct OutputObserver<'p, 'a> {
    history: HistoryWriter<BufWriter<File>>,
    field: FieldWriter<BufWriter<File>>,
    checkpoint: PathBuf,
    progress_cb: &'p mut Option<&'a mut dyn FnMut(RunProgressEvent)>,
    started: Instant,
}

fn observer_error(err: ResultsError) -> SolverError {
    SolverError::Observer {
        what: err.to_string(),
    }
}

impl IterationObserver for OutputObserver<'_, '_> {
    fn on_residuals(&mut self, report: &IterationReport) -> SolverResult<()> {
        self.history.record(report).map_err(observer_error)?;
        emit_progress(
            &mut *self.progress_cb,
            RunStage::Iterating,
            self.started,
            None,
            Some(IterationProgress::from(report)),
        );
        Ok(())
    }

    fn on_snapshot(&mut self, snapshot: &Snapshot<'_>) -> SolverResult<()> {
        self.field.write_zone(snapshot).map_err(observer_error)?;
        write_checkpoint(&self.checkpoint, snapshot).map_err(observer_error)
    }
}

/// Execute the run described by a case file.
pub fn run_case(request: &RunRequest) -> AppResult<RunResponse> {
    run_case_with_progress(request, None)
}

/// Execute a run and stream progress events.
pub fn run_case_with_progress(
    request: &RunRequest,
    mut progress_cb: Option<&mut dyn FnMut(RunProgressEvent)>,
) -> AppResult<RunResponse> {
    let started = Instant::now();
    let mut timing = RunTimingSummary::default();

    emit_progress(
        &mut progress_cb,
        RunStage::LoadingCase,
        started,
        Some(format!("Loading {}", request.case_path.display())),
        None,
    );

    let case = case_service::load_case(request.case_path)?;
    let case = apply_overrides(case, &request.options)?;
    let config = solver_config(&case)?;

    let start = match &case.restart {
        Some(restart) => {
            // Overrides come from the command line and are taken as given
            let path = if request.options.restart.is_some() {
                restart.path.clone()
            } else {
                resolve(request.case_path, &restart.path)
            };
            emit_progress(
                &mut progress_cb,
                RunStage::LoadingRestart,
                started,
                Some(format!("Reading checkpoint {}", path.display())),
                None,
            );
            StartFrom::Restart(load_restart(&path, &config.grid)?)
        }
        None => StartFrom::Fresh,
    };

    let output_dir = if request.options.output_dir.is_some() {
        case.output.directory.clone()
    } else {
        resolve(request.case_path, &case.output.directory)
    };
    let store = RunStore::new(output_dir.clone())?;
    let run_id = cf_results::compute_run_id(&case, &request.options.solver_version)?;

    let mut solver = CavitySolver::new(config, start)?;
    let first_iteration = solver.next_iteration();
    info!(
        case = %case.name,
        run_id = %run_id,
        output = %output_dir.display(),
        "run prepared"
    );
    timing.setup_time_s = started.elapsed().as_secs_f64();

    emit_progress(
        &mut progress_cb,
        RunStage::Iterating,
        started,
        Some(format!(
            "Iterating from {} with {}",
            first_iteration,
            solver.config().relaxation.name()
        )),
        None,
    );
    let solve_started = Instant::now();
    let summary = {
        let mut observer = OutputObserver {
            history: HistoryWriter::create(&store.history_path())?,
            field: FieldWriter::create(&store.field_path())?,
            checkpoint: store.checkpoint_path(),
            progress_cb: &mut progress_cb,
            started,
        };
        solver.run(&mut observer)?
    };
    timing.solve_time_s = solve_started.elapsed().as_secs_f64();
    timing.iterations_executed = (summary.iterations + 1).saturating_sub(first_iteration);

    emit_progress(
        &mut progress_cb,
        RunStage::SavingResults,
        started,
        Some("Writing run manifest".to_string()),
        None,
    );
    let save_started = Instant::now();
    let manifest = RunManifest {
        run_id: run_id.clone(),
        case_name: case.name.clone(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        solver_version: request.options.solver_version.clone(),
        relaxation: relaxation_name(case.relaxation).to_string(),
        boundary: boundary_name(case.boundary).to_string(),
        imax: case.grid.imax,
        jmax: case.grid.jmax,
        outcome: RunOutcome::from(&summary),
    };
    store.save_manifest(&manifest)?;
    timing.save_time_s = save_started.elapsed().as_secs_f64();
    timing.total_time_s = started.elapsed().as_secs_f64();

    info!(
        status = summary.status.as_str(),
        iterations = summary.iterations,
        total_s = timing.total_time_s,
        "run finished"
    );
    emit_progress(
        &mut progress_cb,
        RunStage::Completed,
        started,
        Some(format!("Run {}", summary.status.as_str())),
        None,
    );

    Ok(RunResponse {
        run_id,
        output_dir,
        manifest,
        summary,
        timing,
    })
}

/// Load the manifest stored in a run's output directory.
pub fn load_run(output_dir: &Path) -> AppResult<RunManifest> {
    let store = RunStore::open(output_dir)?;
    Ok(store.load_manifest()?)
}
