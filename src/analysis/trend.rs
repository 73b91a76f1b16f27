//! Linear trend analysis.
//!
//! Fits an ordinary least squares line through a metric series and
//! describes it: direction, strength relative to the value range, and how
//! much the fit can be trusted.

use crate::core::{positions, validate_series, values, DataPoint};
use crate::error::{AnalyticsError, Result};
use crate::utils::ols::{fit_line, LineFit};
use statrs::distribution::{ContinuousCDF, StudentsT};
use std::fmt;

/// Minimum number of observations required to fit a trend.
pub const MIN_TREND_POINTS: usize = 2;

/// Direction of a fitted trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TrendDirection {
    Increasing,
    Decreasing,
    Stable,
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrendDirection::Increasing => "increasing",
            TrendDirection::Decreasing => "decreasing",
            TrendDirection::Stable => "stable",
        };
        f.write_str(name)
    }
}

/// Result of fitting a trend to a series.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TrendResult {
    /// Change in value per unit of `x`.
    pub slope: f64,
    /// Fitted value at `x = 0`.
    pub intercept: f64,
    /// Classified direction.
    pub direction: TrendDirection,
    /// Fitted change over the observed span relative to the value range, in `[0, 1]`.
    pub strength: f64,
    /// Overall confidence in the trend, in `[0, 100]`.
    pub confidence: f64,
    /// One minus the two-sided p-value of the slope, in `[0, 1]`.
    pub statistical_significance: f64,
    /// Coefficient of determination of the fit.
    pub r_squared: f64,
    /// Number of observations the trend was fitted on.
    pub sample_size: usize,
}

impl TrendResult {
    /// Evaluate the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Configuration for trend analysis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TrendConfig {
    /// Fitted change over the observed `x` span, as a fraction of mean `|y|`,
    /// below which a trend is stable.
    pub direction_threshold: f64,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self {
            direction_threshold: 0.01,
        }
    }
}

impl TrendConfig {
    /// Set the relative change threshold for a non-stable direction.
    pub fn with_direction_threshold(mut self, threshold: f64) -> Self {
        self.direction_threshold = threshold.abs();
        self
    }
}

/// Ordinary least squares trend analyzer.
#[derive(Debug, Clone, Default)]
pub struct TrendAnalyzer {
    config: TrendConfig,
}

impl TrendAnalyzer {
    /// Create an analyzer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with custom configuration.
    pub fn with_config(config: TrendConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &TrendConfig {
        &self.config
    }

    /// Fit a trend to a chronologically ordered series.
    ///
    /// # Errors
    /// * `InsufficientData` for fewer than two points.
    /// * `DegenerateInput` when every `x` is identical.
    /// * `InvalidSeries` when the series is unordered or non-finite.
    pub fn fit(&self, series: &[DataPoint]) -> Result<TrendResult> {
        let n = series.len();
        if n < MIN_TREND_POINTS {
            return Err(AnalyticsError::insufficient(MIN_TREND_POINTS, n));
        }
        if series.windows(2).all(|w| w[0].x == w[1].x) {
            return Err(AnalyticsError::DegenerateInput(
                "all x values are identical".to_string(),
            ));
        }
        validate_series(series)?;

        let x = positions(series);
        let y = values(series);
        let line = fit_line(&x, &y)?;

        let direction = self.direction(line.slope, &x, &y);
        let strength = strength(&line, &x, &y);
        let statistical_significance = slope_significance(&line)?;
        let confidence = confidence_score(line.r_squared, statistical_significance, n);

        tracing::debug!(
            n,
            slope = line.slope,
            r_squared = line.r_squared,
            %direction,
            "fitted trend"
        );

        Ok(TrendResult {
            slope: line.slope,
            intercept: line.intercept,
            direction,
            strength,
            confidence,
            statistical_significance,
            r_squared: line.r_squared,
            sample_size: n,
        })
    }

    /// Fit a trend to raw values placed at `x = 0, 1, 2, ...`.
    pub fn fit_values(&self, values: &[f64]) -> Result<TrendResult> {
        self.fit(&DataPoint::from_values(values))
    }

    /// Classify the fitted change over the observed span against a threshold
    /// scaled to the series' magnitude.
    fn direction(&self, slope: f64, x: &[f64], y: &[f64]) -> TrendDirection {
        let scale = y.iter().map(|v| v.abs()).sum::<f64>() / y.len() as f64;
        let threshold = self.config.direction_threshold * scale;
        let change = slope * (x[x.len() - 1] - x[0]);
        if change > threshold {
            TrendDirection::Increasing
        } else if change < -threshold {
            TrendDirection::Decreasing
        } else {
            TrendDirection::Stable
        }
    }
}

/// Fitted rise over the observed `x` span divided by the observed value range.
fn strength(line: &LineFit, x: &[f64], y: &[f64]) -> f64 {
    let (y_min, y_max) = y
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = y_max - y_min;
    if range <= 0.0 {
        return 0.0;
    }
    let span = x[x.len() - 1] - x[0];
    (line.slope.abs() * span / range).clamp(0.0, 1.0)
}

/// Confidence in `[0, 100]`: fit quality times significance, discounted for tiny samples.
fn confidence_score(r_squared: f64, significance: f64, n: usize) -> f64 {
    let sample_weight = (n.saturating_sub(1)) as f64 / n.max(1) as f64;
    (100.0 * r_squared * significance * sample_weight).clamp(0.0, 100.0)
}

/// `1 - p` for the two-sided t-test of a non-zero slope with `n - 2` degrees of freedom.
fn slope_significance(line: &LineFit) -> Result<f64> {
    let df = line.n.saturating_sub(2);
    if df == 0 || line.constant_y || line.r_squared <= 0.0 {
        return Ok(0.0);
    }
    if line.r_squared >= 1.0 {
        return Ok(1.0);
    }

    let t = (line.r_squared * df as f64 / (1.0 - line.r_squared)).sqrt();
    let dist = StudentsT::new(0.0, 1.0, df as f64)
        .map_err(|e| AnalyticsError::Computation(e.to_string()))?;
    let p_value = 2.0 * (1.0 - dist.cdf(t));
    Ok((1.0 - p_value).clamp(0.0, 1.0))
}
