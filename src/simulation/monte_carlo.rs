//! Monte Carlo simulation of arbitrary random quantities.
//!
//! Draws samples from a caller-supplied generator, bins them into an
//! equal-width histogram, and summarises them with empirical statistics.
//! Confidence intervals come from sample percentiles, so skewed samplers
//! get skewed intervals.

use crate::core::ConfidenceInterval;
use crate::error::{AnalyticsError, Result};
use crate::utils::stats::{mean, percentile_sorted, variance};
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Configuration for Monte Carlo simulation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MonteCarloConfig {
    /// Random seed for reproducibility (None for entropy).
    pub seed: Option<u64>,
    /// Levels of the reported confidence intervals, each in `(0, 1)`.
    pub confidence_levels: Vec<f64>,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            seed: None,
            confidence_levels: vec![0.68, 0.95, 0.99],
        }
    }
}

impl MonteCarloConfig {
    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Replace the reported confidence levels.
    pub fn with_confidence_levels(mut self, levels: Vec<f64>) -> Self {
        self.confidence_levels = levels;
        self
    }
}

/// One histogram bin.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DistributionBin {
    /// Midpoint of the bin.
    pub value: f64,
    /// Share of samples falling in the bin.
    pub probability: f64,
}

/// Named percentiles of the simulated samples.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Percentiles {
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

/// Summary statistics of the simulated samples.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationStatistics {
    pub mean: f64,
    pub median: f64,
    pub standard_deviation: f64,
    /// Sample variance (`n - 1` denominator); zero for a single sample.
    pub variance: f64,
    pub min: f64,
    pub max: f64,
    pub percentiles: Percentiles,
}

/// Outcome of a simulation run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationResult {
    /// Equal-width histogram over `[min, max]`, lowest bin first.
    pub distribution: Vec<DistributionBin>,
    pub statistics: SimulationStatistics,
    /// Empirical intervals, one per configured level.
    pub confidence_intervals: Vec<ConfidenceInterval>,
    /// Number of samples drawn.
    pub iterations: usize,
    #[cfg_attr(feature = "serde", serde(skip))]
    sorted_samples: Vec<f64>,
}

impl SimulationResult {
    /// Share of samples strictly below `threshold`.
    pub fn probability_below(&self, threshold: f64) -> f64 {
        if self.sorted_samples.is_empty() {
            return 0.0;
        }
        let below = self.sorted_samples.partition_point(|&v| v < threshold);
        below as f64 / self.sorted_samples.len() as f64
    }

    /// Interval at `level`, if it was one of the configured levels.
    pub fn interval(&self, level: f64) -> Option<&ConfidenceInterval> {
        self.confidence_intervals
            .iter()
            .find(|ci| (ci.level - level).abs() < 1e-12)
    }

    /// All drawn samples in ascending order.
    pub fn samples(&self) -> &[f64] {
        &self.sorted_samples
    }
}

/// Monte Carlo simulator.
#[derive(Debug, Clone, Default)]
pub struct MonteCarloSimulator {
    config: MonteCarloConfig,
}

impl MonteCarloSimulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Draw `iterations` samples from `sampler` and summarise them.
    ///
    /// # Errors
    /// * `InvalidParameter` when `iterations` or `bin_count` is zero, or a
    ///   configured confidence level lies outside `(0, 1)`.
    /// * `DegenerateInput` when the sampler yields a non-finite value.
    /// * `DegenerateInput` when the samples span a range too wide for
    ///   finite bin widths.
    pub fn simulate<F>(
        &self,
        mut sampler: F,
        iterations: usize,
        bin_count: usize,
    ) -> Result<SimulationResult>
    where
        F: FnMut() -> f64,
    {
        if iterations == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "iterations must be at least 1".to_string(),
            ));
        }
        if bin_count == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "bin count must be at least 1".to_string(),
            ));
        }
        if let Some(&level) = self
            .config
            .confidence_levels
            .iter()
            .find(|&&l| !(l > 0.0 && l < 1.0))
        {
            return Err(AnalyticsError::InvalidParameter(format!(
                "confidence level must be in (0, 1), got {}",
                level
            )));
        }

        let mut samples = Vec::with_capacity(iterations);
        for i in 0..iterations {
            let value = sampler();
            if !value.is_finite() {
                return Err(AnalyticsError::DegenerateInput(format!(
                    "sampler produced non-finite value {} at iteration {}",
                    value, i
                )));
            }
            samples.push(value);
        }
        samples.sort_by(f64::total_cmp);

        let distribution = histogram(&samples, bin_count)?;
        let statistics = summarise(&samples);
        let confidence_intervals = self
            .config
            .confidence_levels
            .iter()
            .map(|&level| {
                let alpha = (1.0 - level) / 2.0;
                ConfidenceInterval::new(
                    percentile_sorted(&samples, alpha),
                    percentile_sorted(&samples, 1.0 - alpha),
                    level,
                )
            })
            .collect();

        tracing::debug!(
            iterations,
            bin_count,
            mean = statistics.mean,
            std = statistics.standard_deviation,
            "monte carlo simulation complete"
        );

        Ok(SimulationResult {
            distribution,
            statistics,
            confidence_intervals,
            iterations,
            sorted_samples: samples,
        })
    }

    /// Simulate draws from a probability distribution using the configured seed.
    pub fn simulate_distribution<D>(
        &self,
        distribution: &D,
        iterations: usize,
        bin_count: usize,
    ) -> Result<SimulationResult>
    where
        D: Distribution<f64>,
    {
        let mut rng: StdRng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.simulate(|| distribution.sample(&mut rng), iterations, bin_count)
    }
}

/// Equal-width bins over the sample range. With zero range every sample
/// lands in the first bin.
fn histogram(sorted: &[f64], bin_count: usize) -> Result<Vec<DistributionBin>> {
    let min = sorted[0];
    let max = sorted[sorted.len() - 1];
    let width = (max - min) / bin_count as f64;
    if !width.is_finite() {
        return Err(AnalyticsError::DegenerateInput(format!(
            "sample range [{}, {}] is too wide to bin",
            min, max
        )));
    }

    let mut counts = vec![0usize; bin_count];
    for &v in sorted {
        let idx = if width > 0.0 {
            (((v - min) / width).floor() as usize).min(bin_count - 1)
        } else {
            0
        };
        counts[idx] += 1;
    }

    let total = sorted.len() as f64;
    Ok(counts
        .iter()
        .enumerate()
        .map(|(i, &count)| DistributionBin {
            value: min + (i as f64 + 0.5) * width,
            probability: count as f64 / total,
        })
        .collect())
}

fn summarise(sorted: &[f64]) -> SimulationStatistics {
    let var = if sorted.len() > 1 { variance(sorted) } else { 0.0 };
    let q = |p: f64| percentile_sorted(sorted, p);

    SimulationStatistics {
        mean: mean(sorted),
        median: q(0.5),
        standard_deviation: var.sqrt(),
        variance: var,
        min: sorted[0],
        max: sorted[sorted.len() - 1],
        percentiles: Percentiles {
            p5: q(0.05),
            p10: q(0.10),
            p25: q(0.25),
            p50: q(0.50),
            p75: q(0.75),
            p90: q(0.90),
            p95: q(0.95),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::distributions::Uniform;
    use rand_distr::{LogNormal, Normal};

    fn seeded(seed: u64) -> MonteCarloSimulator {
        MonteCarloSimulator::with_config(MonteCarloConfig::default().with_seed(seed))
    }

    #[test]
    fn probabilities_sum_to_one() {
        let result = seeded(7)
            .simulate_distribution(&Normal::new(10.0, 2.0).unwrap(), 5_000, 40)
            .unwrap();
        let total: f64 = result.distribution.iter().map(|b| b.probability).sum();
        assert_relative_eq!(total, 1.0, epsilon = 1e-9);
        assert_eq!(result.distribution.len(), 40);
        assert!(result
            .distribution
            .windows(2)
            .all(|w| w[1].value > w[0].value));
    }

    #[test]
    fn counter_sampler_has_exact_statistics() {
        let mut next = 0.0;
        let result = MonteCarloSimulator::new()
            .simulate(
                || {
                    let v = next;
                    next += 1.0;
                    v
                },
                100,
                10,
            )
            .unwrap();

        let stats = result.statistics;
        assert_relative_eq!(stats.mean, 49.5);
        assert_relative_eq!(stats.median, 49.5);
        assert_eq!(stats.min, 0.0);
        assert_eq!(stats.max, 99.0);
        assert_relative_eq!(stats.variance, 841.6666666666666, epsilon = 1e-9);
        for bin in &result.distribution {
            assert_relative_eq!(bin.probability, 0.1, epsilon = 1e-12);
        }
        assert_relative_eq!(result.distribution[0].value, 4.95, epsilon = 1e-12);
    }

    #[test]
    fn standard_normal_recovers_known_quantiles() {
        let result = seeded(42)
            .simulate_distribution(&Normal::new(0.0, 1.0).unwrap(), 20_000, 50)
            .unwrap();
        let stats = result.statistics;
        assert!(stats.mean.abs() < 0.05);
        assert!((stats.standard_deviation - 1.0).abs() < 0.05);

        let ci95 = result.interval(0.95).unwrap();
        assert!((ci95.lower + 1.96).abs() < 0.1, "lower {}", ci95.lower);
        assert!((ci95.upper - 1.96).abs() < 0.1, "upper {}", ci95.upper);

        let p = stats.percentiles;
        assert!(p.p5 <= p.p10 && p.p10 <= p.p25 && p.p25 <= p.p50);
        assert!(p.p50 <= p.p75 && p.p75 <= p.p90 && p.p90 <= p.p95);
        assert_eq!(p.p50, stats.median);
    }

    #[test]
    fn skewed_sampler_gives_skewed_interval() {
        let result = seeded(3)
            .simulate_distribution(&LogNormal::new(0.0, 0.8).unwrap(), 10_000, 30)
            .unwrap();
        let median = result.statistics.median;
        let ci = result.interval(0.95).unwrap();
        assert!(ci.upper - median > median - ci.lower);
        assert!(result.statistics.mean > median);
    }

    #[test]
    fn intervals_nest_by_level() {
        let result = seeded(11)
            .simulate_distribution(&Normal::new(5.0, 3.0).unwrap(), 2_000, 20)
            .unwrap();
        assert_eq!(result.confidence_intervals.len(), 3);
        let (ci68, ci95, ci99) = (
            result.interval(0.68).unwrap(),
            result.interval(0.95).unwrap(),
            result.interval(0.99).unwrap(),
        );
        assert!(ci95.encloses(ci68));
        assert!(ci99.encloses(ci95));
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let dist = Normal::new(100.0, 15.0).unwrap();
        let a = seeded(99).simulate_distribution(&dist, 1_000, 25).unwrap();
        let b = seeded(99).simulate_distribution(&dist, 1_000, 25).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn constant_sampler_lands_in_first_bin() {
        let result = MonteCarloSimulator::new().simulate(|| 7.0, 50, 5).unwrap();
        assert_eq!(result.distribution[0].probability, 1.0);
        assert!(result.distribution[1..].iter().all(|b| b.probability == 0.0));
        assert_eq!(result.statistics.variance, 0.0);
        assert_eq!(result.statistics.min, result.statistics.max);
    }

    #[test]
    fn single_iteration() {
        let result = MonteCarloSimulator::new().simulate(|| 3.5, 1, 4).unwrap();
        assert_eq!(result.statistics.variance, 0.0);
        assert_eq!(result.statistics.mean, 3.5);
        assert_eq!(result.iterations, 1);
    }

    #[test]
    fn probability_below_threshold() {
        let result = seeded(5)
            .simulate_distribution(&Uniform::new(0.0, 1.0), 10_000, 10)
            .unwrap();
        assert!((result.probability_below(0.25) - 0.25).abs() < 0.03);
        assert_eq!(result.probability_below(-1.0), 0.0);
        assert_eq!(result.probability_below(2.0), 1.0);
        assert_eq!(result.samples().len(), 10_000);
    }

    #[test]
    fn invalid_parameters() {
        let sim = MonteCarloSimulator::new();
        assert!(matches!(
            sim.simulate(|| 1.0, 0, 10),
            Err(AnalyticsError::InvalidParameter(_))
        ));
        assert!(matches!(
            sim.simulate(|| 1.0, 10, 0),
            Err(AnalyticsError::InvalidParameter(_))
        ));
        let bad_level = MonteCarloSimulator::with_config(
            MonteCarloConfig::default().with_confidence_levels(vec![0.9, 1.0]),
        );
        assert!(matches!(
            bad_level.simulate(|| 1.0, 10, 2),
            Err(AnalyticsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn non_finite_sample_is_degenerate() {
        let mut calls = 0;
        let result = MonteCarloSimulator::new().simulate(
            || {
                calls += 1;
                if calls == 5 {
                    f64::NAN
                } else {
                    1.0
                }
            },
            10,
            2,
        );
        assert!(matches!(result, Err(AnalyticsError::DegenerateInput(_))));
    }

    #[test]
    fn range_overflowing_bin_width_is_degenerate() {
        let mut flip = false;
        let result = MonteCarloSimulator::new().simulate(
            || {
                flip = !flip;
                if flip {
                    -f64::MAX
                } else {
                    f64::MAX
                }
            },
            10,
            4,
        );
        assert!(matches!(result, Err(AnalyticsError::DegenerateInput(_))));
    }

    #[test]
    fn wide_but_finite_range_bins_cleanly() {
        let mut flip = false;
        let result = MonteCarloSimulator::new()
            .simulate(
                || {
                    flip = !flip;
                    if flip {
                        -1e300
                    } else {
                        1e300
                    }
                },
                10,
                4,
            )
            .unwrap();
        assert!(result.distribution.iter().all(|b| b.value.is_finite()));
        assert_eq!(result.distribution[0].probability, 0.5);
        assert_eq!(result.distribution[3].probability, 0.5);
    }
}
