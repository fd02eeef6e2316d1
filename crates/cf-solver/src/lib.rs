//! cf-solver: artificial-compressibility solver for the lid-driven cavity.
//!
//! Steady incompressible Navier-Stokes on a uniform collocated grid, marched
//! in pseudo-time with a local time step. Fourth-order artificial viscosity
//! damps odd-even pressure decoupling; relaxation is either symmetric
//! Gauss-Seidel or point Jacobi. A manufactured solution mode replaces the
//! walls and adds source terms for order-of-accuracy verification.

pub mod artificial_viscosity;
pub mod boundary;
pub mod convergence;
pub mod driver;
pub mod error;
pub mod error_norms;
pub mod manufactured;
pub mod params;
pub mod relaxation;
pub mod rescale;
pub mod time_step;

pub use artificial_viscosity::ArtificialViscosity;
pub use boundary::{BoundaryConditions, BoundaryKind};
pub use convergence::{ConvergenceCheck, ConvergenceMonitor, Residuals, iterative_residuals};
pub use driver::{
    CavitySolver, IterationObserver, IterationReport, NoopObserver, RestartState, Snapshot,
    SnapshotKind, SolveStatus, SolveSummary, StartFrom,
};
pub use error::{SolverError, SolverResult};
pub use error_norms::DiscretizationErrors;
pub use manufactured::{AnalyticSolution, ManufacturedSolution};
pub use params::{
    FlowParameters, NumericalParameters, Parameters, PhysicalInputs, ReportIntervals,
    SolverConfig,
};
pub use relaxation::{RelaxationScheme, StatePair};
pub use rescale::PressureAnchor;
pub use time_step::compute_time_step;
