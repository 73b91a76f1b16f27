//! Data quality scoring.
//!
//! Rates how suitable a series is for trend and seasonality work from three
//! components, each in `[0, 1]`:
//!
//! - **volume**: number of observations, saturating at a target count
//! - **regularity**: how evenly spaced consecutive `x` values are
//! - **variability**: whether the values move at all

use crate::core::DataPoint;
use crate::utils::stats::{mean, std_dev};

/// Configuration for [`DataQualityScorer`].
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QualityConfig {
    /// Observation count at which volume saturates.
    pub target_points: usize,
    /// Weight of the volume component.
    pub volume_weight: f64,
    /// Weight of the regularity component.
    pub regularity_weight: f64,
    /// Weight of the variability component.
    pub variability_weight: f64,
}

impl Default for QualityConfig {
    fn default() -> Self {
        Self {
            target_points: 24,
            volume_weight: 0.4,
            regularity_weight: 0.3,
            variability_weight: 0.3,
        }
    }
}

impl QualityConfig {
    /// Set the saturation count (at least 1).
    pub fn with_target_points(mut self, target: usize) -> Self {
        self.target_points = target.max(1);
        self
    }

    /// Set component weights. Negative weights are treated as zero.
    pub fn with_weights(mut self, volume: f64, regularity: f64, variability: f64) -> Self {
        self.volume_weight = volume.max(0.0);
        self.regularity_weight = regularity.max(0.0);
        self.variability_weight = variability.max(0.0);
        self
    }
}

/// Breakdown of a quality assessment.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct QualityReport {
    pub volume: f64,
    pub regularity: f64,
    pub variability: f64,
    /// Weighted mean of the components.
    pub score: f64,
}

/// Coefficient of variation below which a series counts as flat.
const FLAT_CV: f64 = 0.01;

#[derive(Debug, Clone, Default)]
pub struct DataQualityScorer {
    config: QualityConfig,
}

impl DataQualityScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: QualityConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    /// Overall score in `[0, 1]`.
    pub fn score(&self, series: &[DataPoint]) -> f64 {
        self.assess(series).score
    }

    /// Score each component and combine them.
    ///
    /// Empty series and series holding non-finite values score zero
    /// throughout.
    pub fn assess(&self, series: &[DataPoint]) -> QualityReport {
        if series.is_empty() || series.iter().any(|p| !p.x.is_finite() || !p.y.is_finite()) {
            return QualityReport::default();
        }

        let volume = self.volume(series.len());
        let regularity = regularity(series);
        let variability = variability(series);

        let c = &self.config;
        let total_weight = c.volume_weight + c.regularity_weight + c.variability_weight;
        let score = if total_weight > 0.0 {
            (c.volume_weight * volume
                + c.regularity_weight * regularity
                + c.variability_weight * variability)
                / total_weight
        } else {
            0.0
        };

        let report = QualityReport {
            volume,
            regularity,
            variability,
            score: score.clamp(0.0, 1.0),
        };
        tracing::debug!(
            n = series.len(),
            volume,
            regularity,
            variability,
            score = report.score,
            "data quality assessed"
        );
        report
    }

    fn volume(&self, n: usize) -> f64 {
        (n as f64 / self.config.target_points.max(1) as f64).min(1.0)
    }
}

/// `1 / (1 + cv)` of the gaps between consecutive `x` values.
///
/// Gaps that are not positive (out of order or duplicated `x`) count as
/// fully irregular.
fn regularity(series: &[DataPoint]) -> f64 {
    match series.len() {
        0 | 1 => return 0.0,
        2 => return 1.0,
        _ => {}
    }

    let gaps: Vec<f64> = series.windows(2).map(|w| w[1].x - w[0].x).collect();
    if gaps.iter().any(|&g| g <= 0.0) {
        return 0.0;
    }

    let mean_gap = mean(&gaps);
    let cv = std_dev(&gaps) / mean_gap;
    1.0 / (1.0 + cv)
}

/// Relative spread of the values, saturating once the coefficient of
/// variation reaches [`FLAT_CV`]. Identical values score zero.
fn variability(series: &[DataPoint]) -> f64 {
    if series.len() < 2 {
        return 0.0;
    }
    let y: Vec<f64> = series.iter().map(|p| p.y).collect();
    let spread = std_dev(&y);
    if spread == 0.0 {
        return 0.0;
    }
    let scale = y.iter().map(|v| v.abs()).sum::<f64>() / y.len() as f64;
    let relative = spread / (scale + spread);
    (relative / FLAT_CV).min(1.0)
}
