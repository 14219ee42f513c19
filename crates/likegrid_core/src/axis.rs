//! Scan axes
//!
//! An [`Axis`] is the ordered list of coordinate values at which a likelihood
//! is evaluated along one scan parameter, plus the names used to label it.

use crate::error::{GridError, Result};

/// Ordered, immutable scan coordinates with display metadata
#[derive(Debug, Clone, PartialEq)]
pub struct Axis {
    ticks: Vec<f64>,
    name: String,
    tex_label: String,
}

impl Axis {
    /// Create an axis from its ticks.
    ///
    /// # Arguments
    /// * `ticks` - Points at which the likelihood will be computed
    /// * `name` - Machine-readable name of the axis
    /// * `tex_label` - TeX representation of the name of the axis
    ///
    /// Fails with [`GridError::EmptyAxis`] when `ticks` is empty.
    pub fn new(
        ticks: impl Into<Vec<f64>>,
        name: impl Into<String>,
        tex_label: impl Into<String>,
    ) -> Result<Self> {
        let ticks = ticks.into();
        let name = name.into();
        if ticks.is_empty() {
            return Err(GridError::EmptyAxis { name });
        }
        Ok(Self {
            ticks,
            name,
            tex_label: tex_label.into(),
        })
    }

    /// Create an axis with `points` evenly spaced ticks from `start` to `stop` inclusive.
    pub fn linspace(
        start: f64,
        stop: f64,
        points: usize,
        name: impl Into<String>,
        tex_label: impl Into<String>,
    ) -> Result<Self> {
        let ticks: Vec<f64> = match points {
            0 => Vec::new(),
            1 => vec![start],
            n => {
                let step = (stop - start) / (n - 1) as f64;
                (0..n)
                    .map(|i| if i == n - 1 { stop } else { start + step * i as f64 })
                    .collect()
            }
        };
        Self::new(ticks, name, tex_label)
    }

    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    /// Always false for a constructed axis; provided for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }

    /// Smallest tick value
    pub fn min(&self) -> f64 {
        self.ticks.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// Largest tick value
    pub fn max(&self) -> f64 {
        self.ticks.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Tick at `index`, or [`GridError::IndexOutOfRange`].
    pub fn at(&self, index: usize) -> Result<f64> {
        self.ticks
            .get(index)
            .copied()
            .ok_or_else(|| GridError::IndexOutOfRange {
                axis: self.name.clone(),
                index,
                len: self.ticks.len(),
            })
    }

    /// Axis limits shrunk by a relative margin at both ends.
    ///
    /// Returns `(min + |min * margin|, max - |max * margin|)`.
    pub fn bounds_with_margin(&self, margin: f64) -> (f64, f64) {
        let (min, max) = (self.min(), self.max());
        (min + (min * margin).abs(), max - (max * margin).abs())
    }

    pub fn ticks(&self) -> &[f64] {
        &self.ticks
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tex_label(&self) -> &str {
        &self.tex_label
    }
}
