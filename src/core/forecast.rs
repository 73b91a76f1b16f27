//! Projected future observations.

use super::interval::ConfidenceInterval;
use chrono::{DateTime, Utc};

/// A single projected observation beyond the end of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForecastPoint {
    /// Steps ahead of the last observation (1-based).
    pub step: usize,
    /// Ordinal position of the projection.
    pub x: f64,
    /// Extrapolated date, if the source series is dated.
    pub date: Option<DateTime<Utc>>,
    /// Point prediction.
    pub predicted_value: f64,
    /// Lower interval bound.
    pub lower: f64,
    /// Upper interval bound.
    pub upper: f64,
    /// Confidence level of the bounds.
    pub confidence_level: f64,
}

impl ForecastPoint {
    /// The prediction bounds as an interval.
    pub fn interval(&self) -> ConfidenceInterval {
        ConfidenceInterval::new(self.lower, self.upper, self.confidence_level)
    }

    /// Width of the prediction bounds.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}
