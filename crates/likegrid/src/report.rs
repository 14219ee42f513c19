//! Summaries of stored scans for the `info` command

use std::fmt;

use likegrid_core::{Axis, LikelihoodResults, LikelihoodValues};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisSummary {
    pub name: String,
    pub tex: String,
    pub len: usize,
    pub min: f64,
    pub max: f64,
}

impl From<&Axis> for AxisSummary {
    fn from(axis: &Axis) -> Self {
        Self {
            name: axis.name().to_string(),
            tex: axis.tex_label().to_string(),
            len: axis.len(),
            min: axis.min(),
            max: axis.max(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LikelihoodSummary {
    pub id: String,
    pub tex: String,
    pub order: i64,
    pub max: f64,
    /// Scan coordinate of the best cell, when it maps back onto both axes
    pub best: Option<(f64, f64)>,
}

impl LikelihoodSummary {
    fn new(lh: &LikelihoodValues, x: &Axis, y: &Axis) -> Self {
        let max = lh.max();
        // cells are addressed [iy, ix]
        let best = lh
            .data()
            .indexed_iter()
            .find(|(_, v)| **v == max)
            .and_then(|((iy, ix), _)| Some((x.at(ix).ok()?, y.at(iy).ok()?)));
        Self {
            id: lh.likelihood().to_string(),
            tex: lh.tex_label().to_string(),
            order: lh.order(),
            max,
            best,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanSummary {
    pub x: AxisSummary,
    pub y: AxisSummary,
    pub cells: usize,
    pub likelihoods: Vec<LikelihoodSummary>,
}

impl From<&LikelihoodResults> for ScanSummary {
    fn from(results: &LikelihoodResults) -> Self {
        Self {
            x: results.x().into(),
            y: results.y().into(),
            cells: results.numdata(),
            likelihoods: results
                .likelihoods()
                .iter()
                .map(|lh| LikelihoodSummary::new(lh, results.x(), results.y()))
                .collect(),
        }
    }
}

impl fmt::Display for ScanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (label, axis) in [("x", &self.x), ("y", &self.y)] {
            writeln!(
                f,
                "{label}: {} ({}) {} ticks in [{}, {}]",
                axis.name, axis.tex, axis.len, axis.min, axis.max
            )?;
        }
        writeln!(f, "cells: {}", self.cells)?;
        for lh in &self.likelihoods {
            write!(f, "[{}] {} ({}) max={}", lh.order, lh.id, lh.tex, lh.max)?;
            if let Some((x, y)) = lh.best {
                write!(f, " at ({x}, {y})")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
