use cf_solver::IterationReport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    LoadingCase,
    LoadingRestart,
    Iterating,
    SavingResults,
    Completed,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct IterationProgress {
    pub iteration: usize,
    pub time_s: f64,
    pub dt_min_s: f64,
    pub residuals: [f64; 3],
    pub ratio: f64,
}

impl From<&IterationReport> for IterationProgress {
    fn from(report: &IterationReport) -> Self {
        Self {
            iteration: report.iteration,
            time_s: report.time,
            dt_min_s: report.dt_min,
            residuals: report.residuals.0,
            ratio: report.ratio,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunProgressEvent {
    pub stage: RunStage,
    pub elapsed_wall_s: f64,
    pub message: Option<String>,
    pub iteration: Option<IterationProgress>,
}

impl RunProgressEvent {
    pub fn stage(stage: RunStage, elapsed_wall_s: f64, message: Option<String>) -> Self {
        Self {
            stage,
            elapsed_wall_s,
            message,
            iteration: None,
        }
    }
}
