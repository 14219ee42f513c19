//! Running a configured scan with progress logging

use std::path::Path;

use color_eyre::eyre::WrapErr;
use likegrid_core::{LikelihoodResults, SweepProgress};

use crate::config::ScanConfig;

/// Logs sweep progress at every `step_percent` and at completion
#[derive(Debug, Clone)]
pub struct ProgressLogger {
    step_percent: usize,
    next_percent: usize,
}

impl ProgressLogger {
    pub fn new(step_percent: usize) -> Self {
        let step_percent = step_percent.clamp(1, 100);
        Self {
            step_percent,
            next_percent: step_percent,
        }
    }

    /// Returns the percentage reached when this cell crosses a logging step
    pub fn observe(&mut self, progress: SweepProgress) -> Option<usize> {
        tracing::trace!(
            ix = progress.ix,
            iy = progress.iy,
            completed = progress.completed,
            "cell evaluated"
        );
        let percent = (progress.completed * 100).checked_div(progress.total).unwrap_or(100);
        if percent < self.next_percent {
            return None;
        }
        tracing::info!(
            "Calculating... {percent}% ({}/{})",
            progress.completed,
            progress.total
        );
        self.next_percent = (percent / self.step_percent + 1) * self.step_percent;
        Some(percent)
    }
}

/// Build, evaluate and save the scan described by `config`
pub fn run_scan(
    config: &ScanConfig,
    output: &Path,
    parallel: bool,
) -> color_eyre::Result<LikelihoodResults> {
    tracing::info!("Preparing data structures");
    let (mut results, mut model) = config.build()?;
    tracing::info!(
        cells = results.numdata(),
        likelihoods = results.likelihoods().len(),
        "Generating the likelihood grid"
    );

    if parallel {
        sweep_parallel(&mut results, &model)?;
    } else {
        let mut logger = ProgressLogger::new(10);
        results.calculate_all_with_progress(&mut model, |p| {
            logger.observe(p);
        })?;
    }

    tracing::info!("Saving to {}", output.display());
    results
        .save(output)
        .wrap_err_with(|| format!("failed to save scan to {}", output.display()))?;
    tracing::info!("Finished!");
    Ok(results)
}

#[cfg(feature = "parallel")]
fn sweep_parallel(
    results: &mut LikelihoodResults,
    model: &crate::toy::GaussianModel,
) -> color_eyre::Result<()> {
    let logger = std::sync::Mutex::new(ProgressLogger::new(10));
    results.calculate_all_parallel(model, |p| {
        if let Ok(mut logger) = logger.lock() {
            logger.observe(p);
        }
    })?;
    Ok(())
}

#[cfg(not(feature = "parallel"))]
fn sweep_parallel(
    results: &mut LikelihoodResults,
    model: &crate::toy::GaussianModel,
) -> color_eyre::Result<()> {
    tracing::warn!("built without the `parallel` feature, evaluating sequentially");
    let mut model = model.clone();
    let mut logger = ProgressLogger::new(10);
    results.calculate_all_with_progress(&mut model, |p| {
        logger.observe(p);
    })?;
    Ok(())
}
