//! Command-line front end for two-parameter likelihood scans
//!
//! This crate wires the scan engine in `likegrid_core` to:
//! - YAML scan configuration (axes and likelihood components)
//! - Gaussian toy likelihoods so a scan can run without an external model
//! - Progress reporting and file logging through `tracing`
//! - Text and JSON summaries of stored scans

pub mod config;
pub mod logging;
pub mod report;
pub mod scan;
pub mod toy;

pub use config::{AxisConfig, CombinedConfig, LikelihoodConfig, ScanConfig};
pub use logging::init_logging;
pub use report::ScanSummary;
pub use scan::{ProgressLogger, run_scan};
pub use toy::{GaussianComponent, GaussianModel};
