//! End-to-end runs through the service layer: case file in, output files out.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use cf_app::{
    RunOptions, RunProgressEvent, RunRequest, RunStage, load_run, run_case, run_case_with_progress,
    save_case,
};
use cf_project::CaseFile;

fn unique_temp_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let dir = std::env::temp_dir().join(format!("{}_{}", prefix, nanos));
    fs::create_dir_all(&dir).expect("failed to create temp dir");
    dir
}

fn small_case(dir: &Path, max_iterations: usize) -> PathBuf {
    let mut case = CaseFile::new("smoke");
    case.grid.imax = 9;
    case.grid.jmax = 9;
    case.numerics.max_iterations = max_iterations;
    case.output.solution_interval = 25;
    case.output.residual_interval = 10;
    let path = dir.join("case.yaml");
    save_case(&path, &case).expect("failed to write case");
    path
}

fn data_lines(text: &str) -> usize {
    text.lines()
        .filter(|l| l.starts_with(|c: char| c.is_ascii_digit() || c == '-'))
        .count()
}

#[test]
fn run_writes_history_field_checkpoint_and_manifest() {
    let dir = unique_temp_dir("cf_app_smoke");
    let case_path = small_case(&dir, 60);

    let mut events: Vec<RunProgressEvent> = Vec::new();
    let request = RunRequest {
        case_path: &case_path,
        options: RunOptions::default(),
    };
    let response = run_case_with_progress(&request, Some(&mut |e| events.push(e)))
        .expect("run should succeed");

    assert_eq!(response.output_dir, dir.join("output"));
    assert_eq!(response.summary.iterations, 60);
    assert_eq!(response.manifest.outcome.status, "max_iterations");
    assert_eq!(response.timing.iterations_executed, 60);

    // Residual reports at 1, 10, 20, ..., 60
    let history = fs::read_to_string(response.output_dir.join("history.dat")).unwrap();
    assert_eq!(data_lines(&history), 7);

    // Initial, 25, 50 and final zones
    let field = fs::read_to_string(response.output_dir.join("cavity.dat")).unwrap();
    assert_eq!(field.matches("zone T=").count(), 4);
    assert!(field.contains("zone T=\"n=0\""));
    assert!(field.contains("zone T=\"n=60\""));

    let checkpoint = fs::read_to_string(response.output_dir.join("restart.out")).unwrap();
    assert!(checkpoint.starts_with("60 "));
    assert_eq!(checkpoint.lines().count(), 2 + 81);

    let manifest = load_run(&response.output_dir).expect("manifest should load");
    assert_eq!(manifest, response.manifest);
    assert_eq!(manifest.run_id.len(), 64);

    let stages: Vec<RunStage> = events.iter().map(|e| e.stage).collect();
    assert_eq!(stages.first(), Some(&RunStage::LoadingCase));
    assert_eq!(stages.last(), Some(&RunStage::Completed));
    let reported: Vec<usize> = events
        .iter()
        .filter_map(|e| e.iteration.map(|p| p.iteration))
        .collect();
    assert_eq!(reported, vec![1, 10, 20, 30, 40, 50, 60]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn restart_continues_from_the_checkpoint() {
    let dir = unique_temp_dir("cf_app_restart");
    let case_path = small_case(&dir, 30);

    let first = run_case(&RunRequest {
        case_path: &case_path,
        options: RunOptions::default(),
    })
    .expect("first run should succeed");
    assert_eq!(first.summary.iterations, 30);

    let second_dir = dir.join("resumed");
    let second = run_case(&RunRequest {
        case_path: &case_path,
        options: RunOptions {
            max_iterations: Some(60),
            restart: Some(first.output_dir.join("restart.out")),
            output_dir: Some(second_dir.clone()),
            ..RunOptions::default()
        },
    })
    .expect("restarted run should succeed");

    assert_eq!(second.output_dir, second_dir);
    assert_eq!(second.summary.iterations, 60);
    assert_eq!(second.timing.iterations_executed, 30);
    assert_eq!(
        second.summary.initial_residuals,
        first.summary.initial_residuals
    );
    assert!(second.summary.time > first.summary.time);

    let history = fs::read_to_string(second_dir.join("history.dat")).unwrap();
    let iterations: Vec<&str> = history
        .lines()
        .skip(2)
        .filter_map(|l| l.split_whitespace().next())
        .collect();
    assert_eq!(iterations, vec!["31", "40", "50", "60"]);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn missing_restart_file_is_a_configuration_error() {
    let dir = unique_temp_dir("cf_app_missing_restart");
    let case_path = small_case(&dir, 10);
    let err = run_case(&RunRequest {
        case_path: &case_path,
        options: RunOptions {
            restart: Some(dir.join("nope.out")),
            ..RunOptions::default()
        },
    })
    .unwrap_err();
    assert!(matches!(err, cf_app::AppError::RestartMissing { .. }));
    assert!(!dir.join("output").exists());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn manufactured_run_records_error_norms() {
    let dir = unique_temp_dir("cf_app_mms");
    let mut case = CaseFile::manufactured("mms");
    case.grid.imax = 9;
    case.grid.jmax = 9;
    case.numerics.max_iterations = 20;
    let case_path = dir.join("mms.json");
    save_case(&case_path, &case).unwrap();

    let response = run_case(&RunRequest {
        case_path: &case_path,
        options: RunOptions::default(),
    })
    .unwrap();
    let norms = response
        .manifest
        .outcome
        .error_norms
        .expect("manufactured runs report error norms");
    assert!(norms.l2.iter().all(|v| v.is_finite() && *v >= 0.0));

    let field = fs::read_to_string(response.output_dir.join("cavity.dat")).unwrap();
    assert!(field.contains("\"DE-p\""));
    let _ = fs::remove_dir_all(&dir);
}
