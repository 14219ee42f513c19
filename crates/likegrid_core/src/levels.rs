//! Confidence-region levels
//!
//! Contour plots of a likelihood scan draw regions of constant
//! Δχ² = −2 (ln L − ln L_max). These helpers compute the Δχ² grid for a
//! likelihood and the Δχ² thresholds that correspond to a number of Gaussian
//! standard deviations.

use ndarray::Array2;
use statrs::distribution::{ChiSquared, ContinuousCDF, Normal};

use crate::error::{GridError, Result};
use crate::values::LikelihoodValues;

/// Δχ² for `dof` degrees of freedom matching `n_sigma` Gaussian standard deviations.
///
/// For `dof = 2` and `n_sigma = 1` the result is roughly 2.3.
pub fn delta_chi2(n_sigma: f64, dof: usize) -> Result<f64> {
    if !n_sigma.is_finite() || n_sigma <= 0.0 {
        return Err(GridError::InvalidConfidenceLevel {
            n_sigma,
            dof,
            reason: "n_sigma must be finite and positive",
        });
    }
    if dof == 1 {
        return Ok(n_sigma * n_sigma);
    }

    let chi2 = ChiSquared::new(dof as f64).map_err(|_| GridError::InvalidConfidenceLevel {
        n_sigma,
        dof,
        reason: "degrees of freedom must be positive",
    })?;
    let normal = Normal::new(0.0, 1.0).map_err(|_| GridError::InvalidConfidenceLevel {
        n_sigma,
        dof,
        reason: "standard normal unavailable",
    })?;
    let coverage = (normal.cdf(n_sigma) - 0.5) * 2.0;
    Ok(chi2.inverse_cdf(coverage))
}

/// Δχ² thresholds for each requested number of standard deviations
pub fn contour_levels(n_sigmas: &[f64], dof: usize) -> Result<Vec<f64>> {
    n_sigmas.iter().map(|&n| delta_chi2(n, dof)).collect()
}

impl LikelihoodValues {
    /// Δχ² relative to the best point: `−2 (data − max)`.
    pub fn delta_chi2(&self) -> Array2<f64> {
        let max = self.max();
        self.data().mapv(|v| -2.0 * (v - max))
    }
}
