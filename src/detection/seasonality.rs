//! Seasonality detection.
//!
//! Finds a repeating pattern in a metric series by scanning the
//! autocorrelation of the linearly detrended values for local peaks, then
//! measures the amplitude and phase of the winning period.

use crate::core::DataPoint;
use crate::utils::ols::fit_line;
use crate::utils::stats::autocorrelation;
use std::f64::consts::TAU;

/// Minimum number of observations before seasonality is looked for.
pub const MIN_SEASONAL_OBSERVATIONS: usize = 12;

/// A detected periodic pattern.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeasonalPattern {
    /// Length of one cycle, in samples.
    pub period: usize,
    /// Half the peak-to-trough swing of the cycle.
    pub amplitude: f64,
    /// Phase in radians `[0, 2π)`: the cycle is `amplitude · cos(2π·i/period − phase)`.
    pub phase: f64,
    /// Autocorrelation at the period lag, in `[0, 1]`.
    pub confidence: f64,
}

impl SeasonalPattern {
    /// Sample offset within the cycle at which the pattern peaks.
    pub fn peak_offset(&self) -> f64 {
        self.phase / TAU * self.period as f64
    }
}

/// Configuration for seasonality detection.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SeasonalityConfig {
    /// Minimum period to consider.
    pub min_period: usize,
    /// Maximum period to consider (`None` = half the series length).
    pub max_period: Option<usize>,
    /// Minimum autocorrelation for a period to qualify (0.0 to 1.0).
    pub confidence_floor: f64,
}

impl Default for SeasonalityConfig {
    fn default() -> Self {
        Self {
            min_period: 2,
            max_period: None,
            confidence_floor: 0.3,
        }
    }
}

impl SeasonalityConfig {
    /// Set minimum period.
    pub fn with_min_period(mut self, min: usize) -> Self {
        self.min_period = min.max(2);
        self
    }

    /// Set maximum period.
    pub fn with_max_period(mut self, max: usize) -> Self {
        self.max_period = Some(max);
        self
    }

    /// Set the confidence floor.
    pub fn with_confidence_floor(mut self, floor: f64) -> Self {
        self.confidence_floor = floor.clamp(0.0, 1.0);
        self
    }
}

/// Autocorrelation-based seasonality detector.
#[derive(Debug, Clone, Default)]
pub struct SeasonalityDetector {
    config: SeasonalityConfig,
}

impl SeasonalityDetector {
    /// Create a detector with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with custom configuration.
    pub fn with_config(config: SeasonalityConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &SeasonalityConfig {
        &self.config
    }

    /// Detect the strongest seasonal pattern.
    ///
    /// Returns `None` when fewer than [`MIN_SEASONAL_OBSERVATIONS`] points
    /// are available or no period clears the confidence floor.
    pub fn detect(&self, series: &[DataPoint]) -> Option<SeasonalPattern> {
        let pattern = self.detect_candidates(series).into_iter().next();
        match &pattern {
            Some(p) => tracing::debug!(
                period = p.period,
                amplitude = p.amplitude,
                confidence = p.confidence,
                "seasonal pattern detected"
            ),
            None => tracing::debug!(n = series.len(), "no seasonal pattern"),
        }
        pattern
    }

    /// All qualifying periods, strongest first, with harmonics of stronger
    /// periods removed.
    pub fn detect_candidates(&self, series: &[DataPoint]) -> Vec<SeasonalPattern> {
        let n = series.len();
        if n < MIN_SEASONAL_OBSERVATIONS {
            return Vec::new();
        }

        let y: Vec<f64> = series.iter().map(|p| p.y).collect();
        if y.iter().any(|v| !v.is_finite()) {
            return Vec::new();
        }

        let residuals = match detrend(&y) {
            Some(r) => r,
            None => return Vec::new(),
        };

        // Nothing left once the trend is removed.
        let energy = y.iter().map(|v| v * v).sum::<f64>() / n as f64;
        let variance = residuals.iter().map(|r| r * r).sum::<f64>() / n as f64;
        if variance <= 1e-12 * energy.max(1.0) {
            return Vec::new();
        }

        let min_lag = self.config.min_period.max(2);
        let max_lag = self.config.max_period.unwrap_or(n / 2).min(n / 2);
        if max_lag < min_lag {
            return Vec::new();
        }

        // One lag past the range so the last candidate can be judged a peak.
        let acf: Vec<f64> = (0..=max_lag + 1)
            .map(|lag| autocorrelation(&residuals, lag))
            .collect();

        let peaks = self.find_acf_peaks(&acf, min_lag, max_lag);
        filter_harmonics(peaks)
            .into_iter()
            .map(|(period, score)| {
                let (amplitude, phase) = harmonic(&residuals, period);
                SeasonalPattern {
                    period,
                    amplitude,
                    phase,
                    confidence: score.clamp(0.0, 1.0),
                }
            })
            .collect()
    }

    /// Local maxima of the ACF above the floor, highest first.
    fn find_acf_peaks(&self, acf: &[f64], min_lag: usize, max_lag: usize) -> Vec<(usize, f64)> {
        let mut peaks: Vec<(usize, f64)> = (min_lag..=max_lag)
            .filter(|&lag| {
                let curr = acf[lag];
                curr > acf[lag - 1] && curr > acf[lag + 1] && curr >= self.config.confidence_floor
            })
            .map(|lag| (lag, acf[lag]))
            .collect();

        // Stable sort keeps the shorter period first on ties.
        peaks.sort_by(|a, b| b.1.total_cmp(&a.1));
        peaks
    }
}

/// Remove the least squares line fitted against the sample index.
fn detrend(y: &[f64]) -> Option<Vec<f64>> {
    let index: Vec<f64> = (0..y.len()).map(|i| i as f64).collect();
    let line = fit_line(&index, y).ok()?;
    Some(line.residuals(&index, y))
}

/// Drop periods that are integer multiples of an already accepted period.
fn filter_harmonics(peaks: Vec<(usize, f64)>) -> Vec<(usize, f64)> {
    let mut filtered: Vec<(usize, f64)> = Vec::new();

    for (period, score) in peaks {
        let is_harmonic = filtered.iter().any(|&(base, _)| {
            let ratio = period as f64 / base as f64;
            let rounded = ratio.round();
            (ratio - rounded).abs() < 0.1 && rounded > 1.0
        });

        if !is_harmonic {
            filtered.push((period, score));
        }
    }

    filtered
}

/// Amplitude and phase of the first Fourier harmonic at `period`.
fn harmonic(residuals: &[f64], period: usize) -> (f64, f64) {
    let omega = TAU / period as f64;
    let (mut a, mut b) = (0.0, 0.0);
    for (i, r) in residuals.iter().enumerate() {
        let angle = omega * i as f64;
        a += r * angle.cos();
        b += r * angle.sin();
    }
    let scale = 2.0 / residuals.len() as f64;
    let (a, b) = (a * scale, b * scale);

    let phase = b.atan2(a).rem_euclid(TAU);
    let phase = if phase >= TAU { 0.0 } else { phase };
    (a.hypot(b), phase)
}
