//! Log-likelihood grids
//!
//! A [`LikelihoodValues`] holds one named 2D grid of log-likelihood values.
//! Grids are allocated with shape `(x.len(), y.len())` but written during
//! evaluation at `[y-index, x-index]`. That transposed addressing is part of
//! the stored file format and must not change.

use ndarray::Array2;

use crate::error::{GridError, Result};

/// A grid of log-likelihood values for one likelihood component
#[derive(Debug, Clone, PartialEq)]
pub struct LikelihoodValues {
    data: Array2<f64>,
    likelihood: String,
    tex_label: String,
    order: i64,
}

impl LikelihoodValues {
    /// Wrap an existing grid with ordering key 0.
    ///
    /// # Arguments
    /// * `data` - Grid of log-likelihood values
    /// * `likelihood` - Identifier the likelihood function reports values under
    /// * `tex_label` - TeX representation of the likelihood name
    pub fn new(
        data: Array2<f64>,
        likelihood: impl Into<String>,
        tex_label: impl Into<String>,
    ) -> Self {
        Self {
            data,
            likelihood: likelihood.into(),
            tex_label: tex_label.into(),
            order: 0,
        }
    }

    /// Set the ordering key used for plot stacking and reload order
    pub fn with_order(mut self, order: i64) -> Self {
        self.order = order;
        self
    }

    /// Zero-filled grid of the given shape
    pub fn zeros(
        shape: (usize, usize),
        likelihood: impl Into<String>,
        tex_label: impl Into<String>,
    ) -> Self {
        Self::new(Array2::zeros(shape), likelihood, tex_label)
    }

    /// `(rows, columns)` of the backing grid
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    /// Largest value in the grid.
    ///
    /// NaN cells are skipped. An empty grid yields negative infinity.
    pub fn max(&self) -> f64 {
        self.data.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    pub fn get(&self, row: usize, column: usize) -> Option<f64> {
        self.data.get((row, column)).copied()
    }

    /// Write one cell, failing with [`GridError::CellOutOfRange`] outside the grid.
    pub fn set(&mut self, row: usize, column: usize, value: f64) -> Result<()> {
        let shape = self.shape();
        match self.data.get_mut((row, column)) {
            Some(cell) => {
                *cell = value;
                Ok(())
            }
            None => Err(GridError::CellOutOfRange { row, column, shape }),
        }
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    pub fn likelihood(&self) -> &str {
        &self.likelihood
    }

    pub fn tex_label(&self) -> &str {
        &self.tex_label
    }

    pub fn order(&self) -> i64 {
        self.order
    }
}
