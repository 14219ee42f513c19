//! Scan configuration
//!
//! A scan is described in YAML: the two axes and the likelihood components to
//! evaluate over them.
//!
//! ```yaml
//! x: { name: x1, tex: "$x_1$", start: 0.0, stop: 0.08, points: 50 }
//! y: { name: x3, tex: "$x_3$", ticks: [0.0, 0.2, 0.4, 0.6, 0.8] }
//! likelihoods:
//!   - id: lfu
//!     tex: "LFU"
//!     center: [0.04, 0.4]
//!     sigma: [0.01, 0.1]
//!     correlation: 0.3
//! global: { id: global, tex: "Global" }
//! ```

use std::path::Path;

use color_eyre::eyre::{WrapErr, bail, eyre};
use likegrid_core::{Axis, LikelihoodResults};
use serde::{Deserialize, Serialize};

use crate::toy::{GaussianComponent, GaussianModel};

/// One scan axis: explicit `ticks`, or `points` evenly spaced from `start` to `stop`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisConfig {
    pub name: String,
    #[serde(default)]
    pub tex: Option<String>,
    #[serde(default)]
    pub ticks: Option<Vec<f64>>,
    #[serde(default)]
    pub start: Option<f64>,
    #[serde(default)]
    pub stop: Option<f64>,
    #[serde(default)]
    pub points: Option<usize>,
}

impl AxisConfig {
    pub fn build(&self) -> color_eyre::Result<Axis> {
        let tex = self.tex.clone().unwrap_or_else(|| self.name.clone());
        let axis = match (&self.ticks, self.start, self.stop, self.points) {
            (Some(ticks), None, None, None) => Axis::new(ticks.clone(), &self.name, tex)?,
            (None, Some(start), Some(stop), Some(points)) => {
                Axis::linspace(start, stop, points, &self.name, tex)?
            }
            _ => bail!(
                "axis '{}' needs either `ticks` or all of `start`, `stop` and `points`",
                self.name
            ),
        };
        Ok(axis)
    }
}

/// A Gaussian likelihood component
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LikelihoodConfig {
    pub id: String,
    #[serde(default)]
    pub tex: Option<String>,
    pub center: [f64; 2],
    pub sigma: [f64; 2],
    #[serde(default)]
    pub correlation: f64,
}

/// Optional extra likelihood holding the sum of all components
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedConfig {
    pub id: String,
    #[serde(default)]
    pub tex: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanConfig {
    pub x: AxisConfig,
    pub y: AxisConfig,
    pub likelihoods: Vec<LikelihoodConfig>,
    #[serde(default)]
    pub global: Option<CombinedConfig>,
}

impl ScanConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_saphyr::Error> {
        serde_saphyr::from_str(yaml)
    }

    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        let content = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read scan config {}", path.display()))?;
        Self::from_yaml(&content)
            .map_err(|e| eyre!("invalid scan config {}: {e}", path.display()))
    }

    /// Build the empty results and the model that fills them.
    ///
    /// Likelihoods are registered in config order, with the combined
    /// likelihood last.
    pub fn build(&self) -> color_eyre::Result<(LikelihoodResults, GaussianModel)> {
        if self.likelihoods.is_empty() {
            bail!("scan config declares no likelihoods");
        }

        let (x, y) = (self.x.build()?, self.y.build()?);
        if x.len() != y.len() {
            bail!(
                "axes '{}' ({} ticks) and '{}' ({} ticks) must have the same length: \
                 grid cells are addressed [y index, x index] in an (x len, y len) grid",
                x.name(),
                x.len(),
                y.name(),
                y.len()
            );
        }
        let mut results = LikelihoodResults::new(x, y);
        let mut components = Vec::with_capacity(self.likelihoods.len());
        for lh in &self.likelihoods {
            let tex = lh.tex.clone().unwrap_or_else(|| lh.id.clone());
            results.new_likelihood(&lh.id, tex)?;
            components.push(GaussianComponent::new(
                &lh.id,
                lh.center,
                lh.sigma,
                lh.correlation,
            )?);
        }

        let mut model = GaussianModel::new(components);
        if let Some(global) = &self.global {
            let tex = global.tex.clone().unwrap_or_else(|| global.id.clone());
            results.new_likelihood(&global.id, tex)?;
            model = model.with_combined(&global.id);
        }

        Ok((results, model))
    }
}
