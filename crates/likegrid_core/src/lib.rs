//! Two-parameter likelihood scans
//!
//! This crate manages grids of log-likelihood values computed over a pair of
//! scan parameters, for one or more named likelihood components.
//! It supports:
//! - Scan axes with display labels
//! - Point-by-point evaluation of a user-supplied likelihood function
//!   (sequential, or on a rayon pool with the `parallel` feature)
//! - A hierarchical binary file format with save/load round-trips
//! - Δχ² grids and confidence levels for contour plotting
//!
//! # Example
//!
//! ```ignore
//! use likegrid_core::{Axis, LikelihoodPoint, LikelihoodResults};
//!
//! let x = Axis::linspace(0.0, 0.08, 50, "x1", r"$x_1$")?;
//! let y = Axis::linspace(0.0, 0.8, 50, "x3", r"$x_3$")?;
//! let mut results = LikelihoodResults::new(x, y);
//! results.new_likelihood("global", "Global")?;
//! results.calculate_all(&mut |x: f64, y: f64| {
//!     LikelihoodPoint::from([("global", -(x * x + y * y))])
//! })?;
//! results.save(Path::new("scan.lhg"))?;
//! ```

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod axis;
pub mod error;
pub mod function;
pub mod levels;
pub mod results;
pub mod storage;
pub mod values;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use axis::Axis;
pub use error::{Direction, EvaluationError, GridError, Result, StorageError, StorageResult};
pub use function::{EvaluationResult, LikelihoodFunction, LikelihoodPoint};
pub use levels::{contour_levels, delta_chi2};
pub use results::{INFINITE_LOG_LIKELIHOOD, LikelihoodResults, SweepProgress};
pub use values::LikelihoodValues;
