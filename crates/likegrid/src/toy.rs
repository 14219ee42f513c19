//! Gaussian toy likelihoods for driving scans from a config file

use color_eyre::eyre::bail;
use likegrid_core::{EvaluationResult, LikelihoodFunction, LikelihoodPoint};

/// Bivariate Gaussian log-likelihood, normalised to 0 at its center
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianComponent {
    id: String,
    center: [f64; 2],
    sigma: [f64; 2],
    correlation: f64,
}

impl GaussianComponent {
    pub fn new(
        id: &str,
        center: [f64; 2],
        sigma: [f64; 2],
        correlation: f64,
    ) -> color_eyre::Result<Self> {
        if sigma.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            bail!("likelihood '{id}': sigma must be finite and positive, got {sigma:?}");
        }
        if !correlation.is_finite() || correlation.abs() >= 1.0 {
            bail!("likelihood '{id}': correlation must lie in (-1, 1), got {correlation}");
        }
        Ok(Self {
            id: id.to_string(),
            center,
            sigma,
            correlation,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// `-chi2 / 2` for the point `(x, y)`
    pub fn log_likelihood(&self, x: f64, y: f64) -> f64 {
        let dx = (x - self.center[0]) / self.sigma[0];
        let dy = (y - self.center[1]) / self.sigma[1];
        let rho = self.correlation;
        let chi2 = (dx * dx - 2.0 * rho * dx * dy + dy * dy) / (1.0 - rho * rho);
        -0.5 * chi2
    }
}

/// Evaluates a set of Gaussian components, optionally with their sum
#[derive(Debug, Clone, Default)]
pub struct GaussianModel {
    components: Vec<GaussianComponent>,
    combined: Option<String>,
}

impl GaussianModel {
    pub fn new(components: Vec<GaussianComponent>) -> Self {
        Self {
            components,
            combined: None,
        }
    }

    /// Also report the sum of all components under `id`
    pub fn with_combined(mut self, id: &str) -> Self {
        self.combined = Some(id.to_string());
        self
    }

    pub fn components(&self) -> &[GaussianComponent] {
        &self.components
    }
}

impl LikelihoodFunction for GaussianModel {
    fn evaluate(&mut self, x: f64, y: f64) -> EvaluationResult {
        let mut point = LikelihoodPoint::new();
        let mut total = 0.0;
        for component in &self.components {
            let value = component.log_likelihood(x, y);
            total += value;
            point.insert(component.id(), value);
        }
        if let Some(id) = &self.combined {
            point.insert(id.as_str(), total);
        }
        Ok(point)
    }
}
