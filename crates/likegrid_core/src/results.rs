//! Likelihood scan results
//!
//! [`LikelihoodResults`] owns the two scan axes and every likelihood grid
//! evaluated over them, and drives point-by-point evaluation.

#[cfg(feature = "parallel")]
use std::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::axis::Axis;
use crate::error::{Direction, GridError, Result};
use crate::function::{LikelihoodFunction, LikelihoodPoint};
use crate::values::LikelihoodValues;

/// Stored in place of an infinite log-likelihood
///
/// Finite so that differences from the grid maximum stay finite.
pub const INFINITE_LOG_LIKELIHOOD: f64 = -200.0;

/// Progress of a grid sweep, reported once per evaluated cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SweepProgress {
    /// Cells evaluated so far, including this one
    pub completed: usize,
    /// Cells in the whole sweep
    pub total: usize,
    pub ix: usize,
    pub iy: usize,
}

impl SweepProgress {
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// Everything needed to plot a two-parameter likelihood scan
///
/// Holds the x and y axes and an ordered list of likelihood grids. The list
/// order is the plot stacking order.
#[derive(Debug, Clone, PartialEq)]
pub struct LikelihoodResults {
    x: Axis,
    y: Axis,
    likelihoods: Vec<LikelihoodValues>,
}

fn clamp_infinite(value: f64) -> f64 {
    if value.is_infinite() {
        INFINITE_LOG_LIKELIHOOD
    } else {
        value
    }
}

impl LikelihoodResults {
    pub fn new(x: Axis, y: Axis) -> Self {
        Self {
            x,
            y,
            likelihoods: Vec::new(),
        }
    }

    pub fn x(&self) -> &Axis {
        &self.x
    }

    pub fn y(&self) -> &Axis {
        &self.y
    }

    pub fn likelihoods(&self) -> &[LikelihoodValues] {
        &self.likelihoods
    }

    /// Grid registered under `likelihood`, if any
    pub fn likelihood(&self, likelihood: &str) -> Option<&LikelihoodValues> {
        self.likelihoods
            .iter()
            .find(|lh| lh.likelihood() == likelihood)
    }

    /// Number of cells in each likelihood grid
    pub fn numdata(&self) -> usize {
        self.x.len() * self.y.len()
    }

    /// Grid shape every registered likelihood must have: `(x.len(), y.len())`
    pub fn grid_shape(&self) -> (usize, usize) {
        (self.x.len(), self.y.len())
    }

    /// Every `(ix, iy)` pair of the scan, x-major
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + use<> {
        let ny = self.y.len();
        (0..self.x.len()).flat_map(move |ix| (0..ny).map(move |iy| (ix, iy)))
    }

    fn check_unique(&self, likelihood: &str) -> Result<()> {
        if self.likelihood(likelihood).is_some() {
            return Err(GridError::DuplicateLikelihood {
                id: likelihood.to_string(),
            });
        }
        Ok(())
    }

    /// Add an already-calculated likelihood.
    ///
    /// The grid must have `x.len()` rows and `y.len()` columns. Its ordering
    /// key is kept as given.
    pub fn add_likelihood(&mut self, values: LikelihoodValues) -> Result<()> {
        let (rows, columns) = values.shape();
        if rows != self.x.len() {
            return Err(GridError::ShapeMismatch {
                direction: Direction::X,
                expected: self.x.len(),
                actual: rows,
            });
        }
        if columns != self.y.len() {
            return Err(GridError::ShapeMismatch {
                direction: Direction::Y,
                expected: self.y.len(),
                actual: columns,
            });
        }
        self.check_unique(values.likelihood())?;
        self.likelihoods.push(values);
        Ok(())
    }

    /// Register a new zero-filled likelihood.
    ///
    /// Its ordering key is the number of likelihoods registered before it.
    ///
    /// # Arguments
    /// * `likelihood` - Identifier the likelihood function reports values under
    /// * `tex_label` - TeX representation of the likelihood name
    pub fn new_likelihood(
        &mut self,
        likelihood: impl Into<String>,
        tex_label: impl Into<String>,
    ) -> Result<()> {
        let likelihood = likelihood.into();
        self.check_unique(&likelihood)?;
        let order = self.likelihoods.len() as i64;
        self.likelihoods.push(
            LikelihoodValues::zeros(self.grid_shape(), likelihood, tex_label).with_order(order),
        );
        Ok(())
    }

    /// Stable sort of the likelihoods by ordering key
    pub fn sort_by_order(&mut self) {
        self.likelihoods.sort_by_key(LikelihoodValues::order);
    }

    /// Look up every registered likelihood in `point`, clamping infinities.
    fn resolve(&self, point: &LikelihoodPoint) -> Result<Vec<f64>> {
        self.likelihoods
            .iter()
            .map(|lh| point.get(lh.likelihood()).map(clamp_infinite))
            .collect()
    }

    /// Cells are written at `[iy, ix]`, which may fall outside a non-square grid.
    fn check_cell(&self, ix: usize, iy: usize) -> Result<()> {
        let shape = self.grid_shape();
        if iy >= shape.0 || ix >= shape.1 {
            return Err(GridError::CellOutOfRange {
                row: iy,
                column: ix,
                shape,
            });
        }
        Ok(())
    }

    fn store(&mut self, values: Vec<f64>, ix: usize, iy: usize) -> Result<()> {
        for (lh, value) in self.likelihoods.iter_mut().zip(values) {
            lh.set(iy, ix, value)?;
        }
        Ok(())
    }

    /// Calculate the likelihoods at one point of the grid.
    ///
    /// Evaluates `fun` at `(x[ix], y[iy])` and writes each registered
    /// likelihood's value to cell `[iy, ix]` of its grid. Infinite values are
    /// stored as [`INFINITE_LOG_LIKELIHOOD`]. Nothing is written if any
    /// registered likelihood is missing from the evaluated point.
    pub fn calculate_point<F>(&mut self, fun: &mut F, ix: usize, iy: usize) -> Result<()>
    where
        F: LikelihoodFunction + ?Sized,
    {
        let x = self.x.at(ix)?;
        let y = self.y.at(iy)?;
        self.check_cell(ix, iy)?;
        let point = fun
            .evaluate(x, y)
            .map_err(|source| GridError::Evaluation { x, y, source })?;
        let values = self.resolve(&point)?;
        self.store(values, ix, iy)
    }

    /// Calculate the likelihoods at every point of the grid
    pub fn calculate_all<F>(&mut self, fun: &mut F) -> Result<()>
    where
        F: LikelihoodFunction + ?Sized,
    {
        self.calculate_all_with_progress(fun, |_| {})
    }

    /// Calculate every point of the grid, calling `progress` after each cell.
    ///
    /// The first error aborts the sweep; cells already written keep their values.
    pub fn calculate_all_with_progress<F, P>(&mut self, fun: &mut F, mut progress: P) -> Result<()>
    where
        F: LikelihoodFunction + ?Sized,
        P: FnMut(SweepProgress),
    {
        let total = self.numdata();
        for (completed, (ix, iy)) in self.cells().enumerate() {
            self.calculate_point(fun, ix, iy)?;
            progress(SweepProgress {
                completed: completed + 1,
                total,
                ix,
                iy,
            });
        }
        Ok(())
    }

    /// Calculate every point of the grid on the rayon thread pool.
    ///
    /// Each worker evaluates its own clone of `fun`, so the function is never
    /// called concurrently on one instance. `progress` runs once per cell from
    /// whichever worker finished it. Grids are only written once every cell
    /// has been evaluated successfully.
    #[cfg(feature = "parallel")]
    pub fn calculate_all_parallel<F, P>(&mut self, fun: &F, progress: P) -> Result<()>
    where
        F: LikelihoodFunction + Clone + Send + Sync,
        P: Fn(SweepProgress) + Sync,
    {
        let total = self.numdata();
        let completed = AtomicUsize::new(0);
        let cells: Vec<(usize, usize)> = self.cells().collect();

        let this = &*self;
        let evaluated: Vec<(usize, usize, Vec<f64>)> = cells
            .into_par_iter()
            .map_init(
                || fun.clone(),
                |worker_fun, (ix, iy)| -> Result<(usize, usize, Vec<f64>)> {
                    let x = this.x.at(ix)?;
                    let y = this.y.at(iy)?;
                    this.check_cell(ix, iy)?;
                    let point = worker_fun
                        .evaluate(x, y)
                        .map_err(|source| GridError::Evaluation { x, y, source })?;
                    let values = this.resolve(&point)?;
                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    progress(SweepProgress {
                        completed: done,
                        total,
                        ix,
                        iy,
                    });
                    Ok((ix, iy, values))
                },
            )
            .collect::<Result<_>>()?;

        for (ix, iy, values) in evaluated {
            self.store(values, ix, iy)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn axes() -> (Axis, Axis) {
        (
            Axis::new(vec![0.0, 1.0, 2.0, 3.0, 4.0], "x", "x").unwrap(),
            Axis::new(vec![6.0, 7.0, 8.0, 9.0, 10.0], "y", "y").unwrap(),
        )
    }

    fn results() -> LikelihoodResults {
        let (x, y) = axes();
        LikelihoodResults::new(x, y)
    }

    fn product(x: f64, y: f64) -> LikelihoodPoint {
        LikelihoodPoint::from([("testnew", x * y)])
    }

    #[test]
    fn test_numdata() {
        assert_eq!(results().numdata(), 25);
    }

    #[test]
    fn test_add_likelihood() {
        let mut lhr = results();
        let data = Array2::from_shape_fn((5, 5), |(i, j)| (i * 5 + j) as f64 / 25.0);
        lhr.add_likelihood(LikelihoodValues::new(data, "random", "rnd").with_order(3))
            .unwrap();
        let last = lhr.likelihoods().last().unwrap();
        assert_eq!(last.likelihood(), "random");
        assert_eq!(last.order(), 3);
    }

    #[test]
    fn test_wrong_add_likelihood_x() {
        let mut lhr = results();
        let err = lhr
            .add_likelihood(LikelihoodValues::zeros((6, 5), "random", "rnd"))
            .unwrap_err();
        assert!(matches!(
            err,
            GridError::ShapeMismatch {
                direction: Direction::X,
                expected: 5,
                actual: 6
            }
        ));
        assert!(lhr.likelihoods().is_empty());
    }

    #[test]
    fn test_wrong_add_likelihood_y() {
        let mut lhr = results();
        let err = lhr
            .add_likelihood(LikelihoodValues::zeros((5, 4), "random", "rnd"))
            .unwrap_err();
        assert!(matches!(
            err,
            GridError::ShapeMismatch {
                direction: Direction::Y,
                ..
            }
        ));
        assert!(lhr.likelihoods().is_empty());
    }

    #[test]
    fn test_new_likelihood_orders() {
        let mut lhr = results();
        lhr.new_likelihood("a", "A").unwrap();
        lhr.new_likelihood("b", "B").unwrap();
        lhr.new_likelihood("c", "C").unwrap();

        let orders: Vec<i64> = lhr.likelihoods().iter().map(|lh| lh.order()).collect();
        assert_eq!(orders, vec![0, 1, 2]);
        assert_eq!(lhr.likelihoods()[2].likelihood(), "c");
        assert_eq!(lhr.likelihoods()[0].shape(), (5, 5));
        assert_eq!(lhr.likelihoods()[0].max(), 0.0);
    }

    #[test]
    fn test_duplicate_likelihood() {
        let mut lhr = results();
        lhr.new_likelihood("a", "A").unwrap();
        assert!(matches!(
            lhr.new_likelihood("a", "again"),
            Err(GridError::DuplicateLikelihood { .. })
        ));
        assert_eq!(lhr.likelihoods().len(), 1);
    }

    #[test]
    fn test_calculate_point() {
        let mut lhr = results();
        lhr.new_likelihood("testnew", "testnew").unwrap();
        lhr.calculate_point(&mut product, 3, 1).unwrap();
        // transposed: row is the y index
        assert_eq!(lhr.likelihoods()[0].get(1, 3), Some(21.0));
    }

    #[test]
    fn test_calculate_all() {
        let mut lhr = results();
        lhr.new_likelihood("testnew", "testnew").unwrap();
        lhr.calculate_all(&mut product).unwrap();
        assert_eq!(lhr.likelihoods()[0].get(2, 3), Some(24.0));
        assert_eq!(lhr.likelihoods()[0].max(), 40.0);
    }

    #[test]
    fn test_calculate_missing_likelihood() {
        let mut lhr = results();
        lhr.new_likelihood("testnew", "testnew").unwrap();
        let mut fun = |x: f64, y: f64| LikelihoodPoint::from([("testold", x * y)]);
        let err = lhr.calculate_point(&mut fun, 3, 1).unwrap_err();
        assert!(matches!(err, GridError::MissingLikelihood { id } if id == "testnew"));
        assert!(lhr.calculate_all(&mut fun).is_err());
    }

    #[test]
    fn test_missing_likelihood_writes_nothing() {
        let mut lhr = results();
        lhr.new_likelihood("testnew", "testnew").unwrap();
        lhr.new_likelihood("other", "other").unwrap();
        lhr.calculate_point(&mut product, 3, 1).unwrap_err();
        assert_eq!(lhr.likelihoods()[0].get(1, 3), Some(0.0));
    }

    #[test]
    fn test_extra_likelihoods_ignored() {
        let mut lhr = results();
        lhr.new_likelihood("testnew", "testnew").unwrap();
        let mut fun =
            |x: f64, y: f64| LikelihoodPoint::from([("testnew", x + y), ("unused", 1.0)]);
        lhr.calculate_point(&mut fun, 0, 0).unwrap();
        assert_eq!(lhr.likelihoods()[0].get(0, 0), Some(6.0));
    }

    #[test]
    fn test_infinite_values_clamped() {
        let mut lhr = results();
        lhr.new_likelihood("pos", "pos").unwrap();
        lhr.new_likelihood("neg", "neg").unwrap();
        let mut fun = |_: f64, _: f64| {
            LikelihoodPoint::from([("pos", f64::INFINITY), ("neg", f64::NEG_INFINITY)])
        };
        lhr.calculate_point(&mut fun, 2, 4).unwrap();
        assert_eq!(lhr.likelihoods()[0].get(4, 2), Some(-200.0));
        assert_eq!(lhr.likelihoods()[1].get(4, 2), Some(-200.0));
    }

    #[test]
    fn test_index_out_of_range() {
        let mut lhr = results();
        lhr.new_likelihood("testnew", "testnew").unwrap();
        let err = lhr.calculate_point(&mut product, 5, 0).unwrap_err();
        assert!(matches!(err, GridError::IndexOutOfRange { index: 5, .. }));
    }

    #[test]
    fn test_progress_once_per_cell() {
        let mut lhr = results();
        lhr.new_likelihood("testnew", "testnew").unwrap();
        let mut seen = Vec::new();
        lhr.calculate_all_with_progress(&mut product, |p| seen.push(p))
            .unwrap();
        assert_eq!(seen.len(), 25);
        assert_eq!(seen.last().unwrap().completed, 25);
        assert_eq!(seen.last().unwrap().total, 25);
        assert_eq!(seen[1].iy, 1);
        assert_eq!(seen[1].ix, 0);
    }

    #[test]
    fn test_non_square_grid_cell_out_of_range() {
        let x = Axis::new(vec![0.0, 1.0, 2.0], "x", "x").unwrap();
        let y = Axis::new(vec![0.0, 1.0, 2.0, 3.0], "y", "y").unwrap();
        let mut lhr = LikelihoodResults::new(x, y);
        lhr.new_likelihood("testnew", "testnew").unwrap();

        lhr.calculate_point(&mut product, 2, 2).unwrap();
        let err = lhr.calculate_point(&mut product, 0, 3).unwrap_err();
        assert!(matches!(
            err,
            GridError::CellOutOfRange {
                row: 3,
                column: 0,
                shape: (3, 4)
            }
        ));
    }

    #[test]
    fn test_evaluation_error_propagates() {
        #[derive(Debug)]
        struct Failing;

        impl LikelihoodFunction for Failing {
            fn evaluate(&mut self, _x: f64, _y: f64) -> crate::function::EvaluationResult {
                Err("backend unavailable".into())
            }
        }

        let mut lhr = results();
        lhr.new_likelihood("testnew", "testnew").unwrap();
        let err = lhr.calculate_all(&mut Failing).unwrap_err();
        assert!(matches!(err, GridError::Evaluation { x, y, .. } if x == 0.0 && y == 6.0));
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_matches_sequential() {
        let mut sequential = results();
        sequential.new_likelihood("testnew", "testnew").unwrap();
        sequential.calculate_all(&mut product).unwrap();

        let mut parallel = results();
        parallel.new_likelihood("testnew", "testnew").unwrap();
        let calls = AtomicUsize::new(0);
        parallel
            .calculate_all_parallel(&product, |_| {
                calls.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();

        assert_eq!(calls.load(Ordering::Relaxed), 25);
        assert_eq!(parallel, sequential);
    }

    #[cfg(feature = "parallel")]
    #[test]
    fn test_parallel_missing_likelihood() {
        let mut lhr = results();
        lhr.new_likelihood("absent", "absent").unwrap();
        let err = lhr.calculate_all_parallel(&product, |_| {}).unwrap_err();
        assert!(matches!(err, GridError::MissingLikelihood { .. }));
        assert_eq!(lhr.likelihoods()[0].max(), 0.0);
    }
}
