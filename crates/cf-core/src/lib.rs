//! cf-core: stable foundation for cavityflow.
//!
//! Contains:
//! - units (uom SI types + constructors)
//! - numeric (Real + float helpers)
//! - grid (uniform grid geometry and dense node fields)
//! - timing (opt-in kernel timers)
//! - error (shared error types)

pub mod error;
pub mod grid;
pub mod numeric;
pub mod timing;
pub mod units;

// Re-exports: nice ergonomics for downstream crates
pub use error::{CfError, CfResult};
pub use grid::{Channel, Field2, Field3, GridGeometry, NEQ};
pub use numeric::*;
pub use units::*;
