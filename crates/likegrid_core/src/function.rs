//! Likelihood function contract
//!
//! A likelihood function takes one `(x, y)` scan coordinate and returns a
//! log-likelihood value for each likelihood component it knows about.

use rustc_hash::FxHashMap;

use crate::error::{EvaluationError, GridError, Result};

/// Outcome of evaluating a likelihood function at one coordinate
pub type EvaluationResult = std::result::Result<LikelihoodPoint, EvaluationError>;

/// Log-likelihood values at one scan coordinate, keyed by likelihood identifier
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LikelihoodPoint {
    values: FxHashMap<String, f64>,
}

impl LikelihoodPoint {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, likelihood: impl Into<String>, value: f64) {
        self.values.insert(likelihood.into(), value);
    }

    /// Value reported for `likelihood`, or [`GridError::MissingLikelihood`].
    pub fn get(&self, likelihood: &str) -> Result<f64> {
        self.values
            .get(likelihood)
            .copied()
            .ok_or_else(|| GridError::MissingLikelihood {
                id: likelihood.to_string(),
            })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, f64)> for LikelihoodPoint {
    fn from_iter<I: IntoIterator<Item = (K, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl<K: Into<String>, const N: usize> From<[(K, f64); N]> for LikelihoodPoint {
    fn from(entries: [(K, f64); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K: Into<String>, S> From<std::collections::HashMap<K, f64, S>> for LikelihoodPoint {
    fn from(map: std::collections::HashMap<K, f64, S>) -> Self {
        map.into_iter().collect()
    }
}

/// Computes log-likelihoods at a scan coordinate
///
/// Implementations may be stateful and are never called concurrently.
/// Parallel sweeps clone the function once per worker instead.
///
/// Any closure `FnMut(f64, f64) -> LikelihoodPoint` implements this trait.
/// Implement it directly when evaluation itself can fail.
pub trait LikelihoodFunction {
    fn evaluate(&mut self, x: f64, y: f64) -> EvaluationResult;
}

impl<F> LikelihoodFunction for F
where
    F: FnMut(f64, f64) -> LikelihoodPoint,
{
    fn evaluate(&mut self, x: f64, y: f64) -> EvaluationResult {
        Ok(self(x, y))
    }
}
