//! Confidence intervals around point estimates.

use crate::core::{ConfidenceInterval, DataPoint};
use crate::error::{AnalyticsError, Result};
use crate::utils::stats::{std_dev, z_score};

/// Builds symmetric intervals from the spread of a series.
///
/// The half-width is `z · s`, where `s` is the sample standard deviation of
/// the series values and `z` the two-sided normal quantile for the level.
/// Higher levels therefore always give strictly wider intervals.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfidenceEstimator;

impl ConfidenceEstimator {
    pub fn new() -> Self {
        Self
    }

    /// Interval around `point_estimate` at `level` using the spread of `series`.
    ///
    /// A single observation has no measurable spread, so the interval
    /// collapses to the point estimate.
    ///
    /// # Errors
    /// * `InvalidParameter` when `level` is outside `(0, 1)`.
    /// * `InsufficientData` for an empty series.
    pub fn interval(
        &self,
        series: &[DataPoint],
        point_estimate: f64,
        level: f64,
    ) -> Result<ConfidenceInterval> {
        let z = z_score(level)?;
        let spread = match series.len() {
            0 => return Err(AnalyticsError::insufficient(1, 0)),
            1 => 0.0,
            _ => {
                let values: Vec<f64> = series.iter().map(|p| p.y).collect();
                std_dev(&values)
            }
        };
        Ok(ConfidenceInterval::symmetric(point_estimate, z * spread, level))
    }

    /// Interval around `point_estimate` for a known standard deviation.
    pub fn interval_from_std(
        &self,
        point_estimate: f64,
        std: f64,
        level: f64,
    ) -> Result<ConfidenceInterval> {
        let z = z_score(level)?;
        if !std.is_finite() || std < 0.0 {
            return Err(AnalyticsError::InvalidParameter(format!(
                "standard deviation must be finite and non-negative, got {}",
                std
            )));
        }
        Ok(ConfidenceInterval::symmetric(point_estimate, z * std, level))
    }
}
