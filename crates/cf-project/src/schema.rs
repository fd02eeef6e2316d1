//! Case file schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const LATEST_VERSION: u32 = 1;

/// One solver run: geometry, physics, numerics and output control.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseFile {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub grid: GridDef,
    #[serde(default)]
    pub flow: FlowDef,
    #[serde(default)]
    pub numerics: NumericsDef,
    #[serde(default)]
    pub relaxation: RelaxationDef,
    #[serde(default)]
    pub boundary: BoundaryDef,
    #[serde(default)]
    pub output: OutputDef,
    /// Checkpoint to resume from; fresh start when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub restart: Option<RestartDef>,
}

impl CaseFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            version: LATEST_VERSION,
            name: name.into(),
            grid: GridDef::default(),
            flow: FlowDef::default(),
            numerics: NumericsDef::default(),
            relaxation: RelaxationDef::default(),
            boundary: BoundaryDef::default(),
            output: OutputDef::default(),
            restart: None,
        }
    }

    /// Default case switched to the manufactured solution.
    pub fn manufactured(name: impl Into<String>) -> Self {
        Self {
            boundary: BoundaryDef::Manufactured,
            ..Self::new(name)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GridDef {
    pub imax: usize,
    pub jmax: usize,
    pub xmin_m: f64,
    pub xmax_m: f64,
    pub ymin_m: f64,
    pub ymax_m: f64,
}

impl Default for GridDef {
    fn default() -> Self {
        Self {
            imax: 65,
            jmax: 65,
            xmin_m: 0.0,
            xmax_m: 0.05,
            ymin_m: 0.0,
            ymax_m: 0.05,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FlowDef {
    pub density_kg_m3: f64,
    pub lid_velocity_m_s: f64,
    pub reynolds: f64,
    pub reference_pressure_pa: f64,
}

impl Default for FlowDef {
    fn default() -> Self {
        Self {
            density_kg_m3: 1.0,
            lid_velocity_m_s: 1.0,
            reynolds: 10.0,
            // Manufactured pressure at the cavity centre
            reference_pressure_pa: 0.801333844662,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct NumericsDef {
    pub cfl: f64,
    pub cx: f64,
    pub cy: f64,
    pub kappa: f64,
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for NumericsDef {
    fn default() -> Self {
        Self {
            cfl: 0.8,
            cx: 0.01,
            cy: 0.01,
            kappa: 0.1,
            tolerance: 1.0e-10,
            max_iterations: 1_000_000,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RelaxationDef {
    #[default]
    SymmetricGaussSeidel,
    PointJacobi,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryDef {
    #[default]
    Cavity,
    Manufactured,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct OutputDef {
    /// Directory for history, field, checkpoint and manifest files
    pub directory: PathBuf,
    /// Iterations between field snapshots and checkpoints
    pub solution_interval: usize,
    /// Iterations between residual reports
    pub residual_interval: usize,
}

impl Default for OutputDef {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("output"),
            solution_interval: 500,
            residual_interval: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RestartDef {
    /// Checkpoint written by a previous run (`restart.out`)
    pub path: PathBuf,
}
