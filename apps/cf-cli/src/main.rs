use cf_app::{
    AppResult, RunOptions, RunProgressEvent, RunRequest, RunStage, RunTimingSummary,
    case_service, run_service,
};
use cf_core::timing::kernel_timing;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Residual reports between repeated column headers.
const HEADER_EVERY: usize = 20;

#[derive(Parser)]
#[command(name = "cf-cli")]
#[command(about = "CavityFlow CLI - lid-driven cavity artificial compressibility solver", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate case file syntax and values
    Validate {
        /// Path to the case file (YAML or JSON)
        case_path: PathBuf,
    },
    /// Run the solver on a case
    Run {
        /// Path to the case file (YAML or JSON)
        case_path: PathBuf,
        /// Directory for history, field, checkpoint and manifest files
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Override the case's iteration limit
        #[arg(long)]
        max_iterations: Option<usize>,
        /// Resume from a checkpoint written by an earlier run
        #[arg(long)]
        restart: Option<PathBuf>,
        /// Do not print the residual table
        #[arg(long)]
        quiet: bool,
    },
    /// Write a case file with default inputs
    Init {
        /// Where to write the case (.yaml, .yml or .json)
        case_path: PathBuf,
        /// Use the manufactured solution instead of the cavity walls
        #[arg(long)]
        manufactured: bool,
    },
    /// Show the manifest of a finished run
    ShowRun {
        /// Output directory of the run
        output_dir: PathBuf,
    },
}

fn main() -> AppResult<()> {
    // RUST_LOG controls verbosity; warnings only by default so the residual table stays readable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { case_path } => cmd_validate(&case_path),
        Commands::Run {
            case_path,
            output_dir,
            max_iterations,
            restart,
            quiet,
        } => cmd_run(
            &case_path,
            RunOptions {
                output_dir,
                max_iterations,
                restart,
                ..RunOptions::default()
            },
            quiet,
        ),
        Commands::Init {
            case_path,
            manufactured,
        } => cmd_init(&case_path, manufactured),
        Commands::ShowRun { output_dir } => cmd_show_run(&output_dir),
    }
}

fn cmd_validate(case_path: &Path) -> AppResult<()> {
    println!("Validating case: {}", case_path.display());
    let case = case_service::load_case(case_path)?;
    let summary = case_service::summarize(&case);
    println!("✓ Case is valid");
    println!(
        "  {} - {}x{} grid, Re = {}, {} relaxation, {} boundaries",
        summary.name,
        summary.imax,
        summary.jmax,
        summary.reynolds,
        summary.relaxation,
        summary.boundary
    );
    println!(
        "  Tolerance {:.1e}, at most {} iterations",
        summary.tolerance, summary.max_iterations
    );
    Ok(())
}

fn cmd_init(case_path: &Path, manufactured: bool) -> AppResult<()> {
    let name = case_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("cavity");
    let case = case_service::default_case(name, manufactured);
    case_service::save_case(case_path, &case)?;
    println!("✓ Wrote {}", case_path.display());
    Ok(())
}

fn cmd_run(case_path: &Path, options: RunOptions, quiet: bool) -> AppResult<()> {
    println!("Running case: {}", case_path.display());

    let request = RunRequest { case_path, options };
    let mut reports = 0usize;
    let response = run_service::run_case_with_progress(
        &request,
        Some(&mut |event| {
            if !quiet {
                render_cli_progress(&event, &mut reports);
            }
        }),
    )?;

    let summary = &response.summary;
    println!(
        "\n✓ Run {} after {} iterations: {}",
        response.run_id.get(..12).unwrap_or(response.run_id.as_str()),
        summary.iterations,
        summary.status.as_str()
    );
    if let Some(ratio) = summary.ratio {
        println!("  Convergence ratio: {:.3e}", ratio);
    }
    let [r1, r2, r3] = summary.residuals.0;
    println!("  Final residuals:   {:.3e} {:.3e} {:.3e}", r1, r2, r3);
    if let Some(norms) = &summary.error_norms {
        println!("\nDiscretization error (p, u, v):");
        println!("  L1:   {:.6e} {:.6e} {:.6e}", norms.l1[0], norms.l1[1], norms.l1[2]);
        println!("  L2:   {:.6e} {:.6e} {:.6e}", norms.l2[0], norms.l2[1], norms.l2[2]);
        println!(
            "  Linf: {:.6e} {:.6e} {:.6e}",
            norms.linf[0], norms.linf[1], norms.linf[2]
        );
    }
    println!("  Output: {}", response.output_dir.display());

    print_timing_summary(&response.timing);
    kernel_timing::print_summary();

    Ok(())
}

fn render_cli_progress(event: &RunProgressEvent, reports: &mut usize) {
    match (event.stage, &event.iteration) {
        (RunStage::Iterating, Some(p)) => {
            if *reports % HEADER_EVERY == 0 {
                println!(
                    "{:>10} {:>14} {:>14} {:>14} {:>14} {:>14}",
                    "iter", "time (s)", "dt (s)", "continuity", "x-momentum", "y-momentum"
                );
            }
            *reports += 1;
            println!(
                "{:>10} {:>14.6e} {:>14.6e} {:>14.6e} {:>14.6e} {:>14.6e}",
                p.iteration, p.time_s, p.dt_min_s, p.residuals[0], p.residuals[1], p.residuals[2]
            );
        }
        _ => {
            if let Some(msg) = &event.message {
                println!("[{:>7.2}s] {}", event.elapsed_wall_s, msg);
            }
        }
    }
}

fn print_timing_summary(timing: &RunTimingSummary) {
    let total = timing.total_time_s.max(1.0e-12);
    let setup_pct = 100.0 * timing.setup_time_s / total;
    let solve_pct = 100.0 * timing.solve_time_s / total;
    let save_pct = 100.0 * timing.save_time_s / total;

    println!("\nTiming summary:");
    println!("  Setup:   {:.3}s ({:.1}%)", timing.setup_time_s, setup_pct);
    println!("  Solve:   {:.3}s ({:.1}%)", timing.solve_time_s, solve_pct);
    println!("  Save:    {:.3}s ({:.1}%)", timing.save_time_s, save_pct);
    println!("  Total:   {:.3}s", timing.total_time_s);
    if timing.iterations_executed > 0 {
        println!(
            "  Per iteration: {:.3e}s",
            timing.solve_time_s / timing.iterations_executed as f64
        );
    }
}

fn cmd_show_run(output_dir: &Path) -> AppResult<()> {
    let manifest = run_service::load_run(output_dir)?;
    let outcome = &manifest.outcome;

    println!("Run {}", manifest.run_id);
    println!("  Case:       {}", manifest.case_name);
    println!("  Started:    {}", manifest.timestamp);
    println!("  Solver:     {}", manifest.solver_version);
    println!(
        "  Setup:      {}x{} grid, {} relaxation, {} boundaries",
        manifest.imax, manifest.jmax, manifest.relaxation, manifest.boundary
    );
    println!("  Status:     {}", outcome.status);
    println!("  Iterations: {}", outcome.iterations);
    println!("  Time:       {}", fmt_opt(outcome.time_s));
    println!(
        "  Residuals:  {} {} {}",
        fmt_opt(outcome.residuals[0]),
        fmt_opt(outcome.residuals[1]),
        fmt_opt(outcome.residuals[2])
    );
    println!("  Ratio:      {}", fmt_opt(outcome.ratio));
    if let Some(norms) = &outcome.error_norms {
        println!(
            "  L2 error:   {:.6e} {:.6e} {:.6e}",
            norms.l2[0], norms.l2[1], norms.l2[2]
        );
    }
    Ok(())
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.3e}", v))
}
