//! Grid statistics and threshold computation strategies.
//!
//! The analyzer derives its strong/weak significance thresholds from the
//! distribution of loaded cell values. The canonical model uses the sample
//! mean and standard deviation; an alternate model fits a Gamma distribution
//! by the method of moments and reads the thresholds off its quantiles.
//! Both are exposed behind the [`ThresholdStrategy`] trait so the analyzer
//! stays agnostic of the model in use.

use statrs::distribution::{ContinuousCDF, Gamma, Normal};

use crate::config::{AnalysisConfig, ThresholdModel};

/// Running statistics over the initialized cells of a grid.
#[derive(Debug, Clone, Copy)]
pub struct GridStats {
    count: usize,
    sum: f64,
    sum_sq: f64,
    min: f32,
    max: f32,
}

impl GridStats {
    /// Creates an empty accumulator.
    pub fn new() -> Self {
        Self {
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
        }
    }

    /// Folds one cell value into the statistics.
    pub fn record(&mut self, value: f32) {
        self.count += 1;
        self.sum += f64::from(value);
        self.sum_sq += f64::from(value) * f64::from(value);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }

    /// Number of recorded cells.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Smallest recorded value.
    #[inline]
    pub fn min(&self) -> f32 {
        self.min
    }

    /// Largest recorded value.
    #[inline]
    pub fn max(&self) -> f32 {
        self.max
    }

    /// Mean of the recorded values. NaN when nothing was recorded.
    pub fn mean(&self) -> f64 {
        self.sum / self.count as f64
    }

    /// Sample variance (`N - 1` divisor). NaN when fewer than two cells
    /// were recorded; may come out non-finite for degenerate data.
    pub fn sample_variance(&self) -> f64 {
        let n = self.count as f64;
        let mean = self.mean();
        (self.sum_sq - mean * mean * n) / (n - 1.0)
    }
}

impl Default for GridStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Significance thresholds derived from grid statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    /// Values at or above this are strong points.
    pub strong: f32,
    /// Values at or below this are ignorable.
    pub weak: f32,
    /// Bonus scale granted to borderline cells near strong points.
    pub weak_assist: f32,
}

/// Strategy seam for threshold computation.
///
/// Returns `None` when the statistics are degenerate (too few cells, or a
/// model precondition fails); the analyzer then resets itself and produces
/// no clusters instead of garbage output.
pub trait ThresholdStrategy {
    fn compute(&self, stats: &GridStats, config: &AnalysisConfig) -> Option<Thresholds>;
}

/// Clamp a threshold into the observed value range.
///
/// Guarantees that at least one cell can qualify as a strong candidate in
/// non-degenerate data.
fn clamp_to_observed(threshold: f32, stats: &GridStats) -> f32 {
    threshold.min(stats.max()).max(stats.min())
}

fn finish(strong: f32, weak: f32, stats: &GridStats, config: &AnalysisConfig) -> Thresholds {
    let strong = clamp_to_observed(strong, stats);
    let weak = clamp_to_observed(weak, stats);

    Thresholds {
        strong,
        weak,
        weak_assist: weak.abs() * (config.padding_level / 10.0),
    }
}

/// Canonical sample mean/standard-deviation thresholds.
///
/// `strong = mean + upper_sensitivity * stddev`,
/// `weak = mean - lower_sensitivity * stddev`, both clamped into the
/// observed value range.
pub struct MeanStdDev;

impl ThresholdStrategy for MeanStdDev {
    fn compute(&self, stats: &GridStats, config: &AnalysisConfig) -> Option<Thresholds> {
        if stats.count() < 2 {
            return None;
        }

        let mean = stats.mean();
        let std_dev = stats.sample_variance().sqrt();
        if !std_dev.is_finite() {
            return None;
        }

        let strong = (mean + f64::from(config.upper_sensitivity) * std_dev) as f32;
        let weak = (mean - f64::from(config.lower_sensitivity) * std_dev) as f32;

        Some(finish(strong, weak, stats, config))
    }
}

/// Gamma-quantile thresholds.
///
/// Fits a Gamma distribution by the method of moments (shape `mean^2/var`,
/// rate `mean/var`) and places the thresholds at the Gamma quantiles whose
/// probabilities correspond to the configured sensitivities under a standard
/// normal. Requires strictly positive mean and variance.
pub struct GammaQuantile;

impl ThresholdStrategy for GammaQuantile {
    fn compute(&self, stats: &GridStats, config: &AnalysisConfig) -> Option<Thresholds> {
        if stats.count() < 2 {
            return None;
        }

        let mean = stats.mean();
        let variance = stats.sample_variance();
        if !variance.is_finite() || variance <= 0.0 || mean <= 0.0 {
            return None;
        }

        let shape = mean * mean / variance;
        let rate = mean / variance;
        let gamma = Gamma::new(shape, rate).ok()?;
        let normal = Normal::new(0.0, 1.0).ok()?;

        let strong_p = normal.cdf(f64::from(config.upper_sensitivity));
        let weak_p = normal.cdf(-f64::from(config.lower_sensitivity));

        let strong = gamma.inverse_cdf(strong_p) as f32;
        let weak = gamma.inverse_cdf(weak_p) as f32;

        Some(finish(strong, weak, stats, config))
    }
}

impl ThresholdModel {
    /// Resolves the configured model to its strategy implementation.
    pub fn strategy(&self) -> &'static dyn ThresholdStrategy {
        match self {
            ThresholdModel::MeanStdDev => &MeanStdDev,
            ThresholdModel::GammaQuantile => &GammaQuantile,
        }
    }
}
