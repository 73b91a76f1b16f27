//! One-call analysis of a metric series.

use crate::analysis::{TrendAnalyzer, TrendResult};
use crate::cache::{CacheKey, ResultCache};
use crate::config::AnalyticsConfig;
use crate::core::{DataPoint, ForecastPoint};
use crate::detection::{SeasonalPattern, SeasonalityDetector};
use crate::error::Result;
use crate::forecast::ForecastEngine;
use crate::simulation::MonteCarloSimulator;
use crate::utils::stats::z_score;
use crate::validation::{CrossValidationResult, CrossValidator, DataQualityScorer, QualityReport};
use chrono::Utc;
use std::sync::Arc;

/// Parameters of a single analysis run.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AnalysisOptions {
    /// Forecast steps; zero skips the forecast.
    pub horizon: usize,
    /// Level of the forecast intervals, in `(0, 1)`.
    pub confidence_level: f64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            horizon: 6,
            confidence_level: 0.95,
        }
    }
}

impl AnalysisOptions {
    pub fn new(horizon: usize, confidence_level: f64) -> Self {
        Self {
            horizon,
            confidence_level,
        }
    }

    fn cache_parameters(&self) -> String {
        format!("horizon={};level={}", self.horizon, self.confidence_level)
    }
}

/// Everything the engine derives from one series.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeriesAnalysis {
    pub trend: TrendResult,
    pub seasonality: Option<SeasonalPattern>,
    pub quality: QualityReport,
    pub validation: CrossValidationResult,
    /// Empty when the horizon was zero.
    pub forecast: Vec<ForecastPoint>,
}

/// Runs every series-level component with a shared configuration.
///
/// The engine itself is stateless; the only shared state is the optional
/// result cache handed in by the caller.
#[derive(Debug, Clone, Default)]
pub struct AnalyticsEngine {
    trend: TrendAnalyzer,
    seasonality: SeasonalityDetector,
    validator: CrossValidator,
    forecaster: ForecastEngine,
    quality: DataQualityScorer,
    simulator: MonteCarloSimulator,
    cache: Option<Arc<ResultCache<SeriesAnalysis>>>,
}

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &AnalyticsConfig) -> Self {
        let trend = TrendAnalyzer::with_config(config.trend.clone());
        Self {
            validator: CrossValidator::with_config(config.walk_forward.clone())
                .with_analyzer(trend.clone()),
            forecaster: ForecastEngine::with_analyzer(trend.clone()),
            trend,
            seasonality: SeasonalityDetector::with_config(config.seasonality.clone()),
            quality: DataQualityScorer::with_config(config.quality.clone()),
            simulator: MonteCarloSimulator::with_config(config.monte_carlo.clone()),
            cache: None,
        }
    }

    /// Serve [`analyze_cached`](Self::analyze_cached) from `cache`.
    pub fn with_cache(mut self, cache: Arc<ResultCache<SeriesAnalysis>>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn cache(&self) -> Option<&Arc<ResultCache<SeriesAnalysis>>> {
        self.cache.as_ref()
    }

    pub fn trend(&self) -> &TrendAnalyzer {
        &self.trend
    }

    pub fn seasonality(&self) -> &SeasonalityDetector {
        &self.seasonality
    }

    pub fn validator(&self) -> &CrossValidator {
        &self.validator
    }

    pub fn forecaster(&self) -> &ForecastEngine {
        &self.forecaster
    }

    pub fn quality(&self) -> &DataQualityScorer {
        &self.quality
    }

    pub fn simulator(&self) -> &MonteCarloSimulator {
        &self.simulator
    }

    /// Analyse `series`: trend, seasonality, quality, walk-forward accuracy
    /// and, for a non-zero horizon, a forecast.
    ///
    /// Fails if any hard precondition fails; seasonality and validation
    /// fall back softly on short series.
    #[tracing::instrument(
        level = "debug",
        skip(self, series, options),
        fields(n = series.len(), horizon = options.horizon)
    )]
    pub fn analyze(&self, series: &[DataPoint], options: &AnalysisOptions) -> Result<SeriesAnalysis> {
        z_score(options.confidence_level)?;

        let trend = self.trend.fit(series)?;
        let forecast = if options.horizon > 0 {
            self.forecaster
                .forecast(series, options.horizon, options.confidence_level)?
        } else {
            Vec::new()
        };
        let validation = self.validator.validate(series)?;
        let seasonality = self.seasonality.detect(series);
        let quality = self.quality.assess(series);

        tracing::debug!(
            direction = %trend.direction,
            seasonal = seasonality.is_some(),
            quality = quality.score,
            accuracy = validation.accuracy,
            "analysis complete"
        );

        Ok(SeriesAnalysis {
            trend,
            seasonality,
            quality,
            validation,
            forecast,
        })
    }

    /// Like [`analyze`](Self::analyze), reusing a cached result for the same
    /// subject and options within the current TTL bucket.
    ///
    /// The subject stands in for the series contents: callers must give
    /// distinct series distinct subjects. Without a cache this always
    /// recomputes.
    pub fn analyze_cached(
        &self,
        subject: &str,
        series: &[DataPoint],
        options: &AnalysisOptions,
    ) -> Result<Arc<SeriesAnalysis>> {
        let Some(cache) = &self.cache else {
            return self.analyze(series, options).map(Arc::new);
        };
        let key = CacheKey::bucketed(subject, options.cache_parameters(), Utc::now(), cache.ttl());
        cache.get_or_try_insert_with(key, || self.analyze(series, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::TrendDirection;
    use crate::error::AnalyticsError;
    use std::f64::consts::TAU;
    use std::time::Duration;

    fn monthly_sales(n: usize) -> Vec<DataPoint> {
        (0..n)
            .map(|i| {
                let t = i as f64;
                DataPoint::new(t, 200.0 + 5.0 * t + 25.0 * (TAU * t / 12.0).sin())
            })
            .collect()
    }

    #[test]
    fn full_analysis() {
        let analysis = AnalyticsEngine::new()
            .analyze(&monthly_sales(48), &AnalysisOptions::default())
            .unwrap();

        assert_eq!(analysis.trend.direction, TrendDirection::Increasing);
        assert_eq!(analysis.seasonality.map(|s| s.period), Some(12));
        assert_eq!(analysis.forecast.len(), 6);
        assert_eq!(analysis.validation.n_folds(), 45);
        assert!(analysis.quality.score > 0.9);
    }

    #[test]
    fn zero_horizon_skips_forecast() {
        let analysis = AnalyticsEngine::new()
            .analyze(&monthly_sales(10), &AnalysisOptions::new(0, 0.9))
            .unwrap();
        assert!(analysis.forecast.is_empty());
        assert!(analysis.seasonality.is_none());
    }

    #[test]
    fn short_series_fails_loudly() {
        let err = AnalyticsEngine::new()
            .analyze(&monthly_sales(1), &AnalysisOptions::default())
            .unwrap_err();
        assert_eq!(err, AnalyticsError::InsufficientData { needed: 2, got: 1 });
    }

    #[test]
    fn invalid_level_is_rejected() {
        let err = AnalyticsEngine::new()
            .analyze(&monthly_sales(10), &AnalysisOptions::new(0, 1.0))
            .unwrap_err();
        assert!(matches!(err, AnalyticsError::InvalidParameter(_)));
    }

    #[test]
    fn cached_analysis_is_shared() {
        let cache = Arc::new(ResultCache::new(Duration::from_secs(900)));
        let engine = AnalyticsEngine::new().with_cache(Arc::clone(&cache));
        let options = AnalysisOptions::default();

        let first = engine.analyze_cached("sales", &monthly_sales(24), &options).unwrap();
        let second = engine.analyze_cached("sales", &monthly_sales(24), &options).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        let other = engine.analyze_cached("refunds", &monthly_sales(30), &options).unwrap();
        assert!(!Arc::ptr_eq(&first, &other));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn options_are_part_of_the_key() {
        let engine = AnalyticsEngine::new().with_cache(Arc::new(ResultCache::new(
            Duration::from_secs(900),
        )));
        let series = monthly_sales(24);
        let a = engine.analyze_cached("sales", &series, &AnalysisOptions::new(3, 0.9)).unwrap();
        let b = engine.analyze_cached("sales", &series, &AnalysisOptions::new(6, 0.9)).unwrap();
        assert_eq!(a.forecast.len(), 3);
        assert_eq!(b.forecast.len(), 6);
    }

    #[test]
    fn failures_are_not_cached() {
        let cache = Arc::new(ResultCache::new(Duration::from_secs(900)));
        let engine = AnalyticsEngine::new().with_cache(Arc::clone(&cache));
        assert!(engine
            .analyze_cached("empty", &[], &AnalysisOptions::default())
            .is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn engine_without_cache_recomputes() {
        let engine = AnalyticsEngine::new();
        let options = AnalysisOptions::default();
        let a = engine.analyze_cached("s", &monthly_sales(12), &options).unwrap();
        let b = engine.analyze_cached("s", &monthly_sales(12), &options).unwrap();
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(*a, *b);
    }

    #[test]
    fn config_flows_into_components() {
        let config = AnalyticsConfig::default()
            .with_walk_forward(crate::validation::WalkForwardConfig::rolling(4));
        let engine = AnalyticsEngine::from_config(&config);
        assert_eq!(engine.validator().config().min_train, 4);
        let analysis = engine
            .analyze(&monthly_sales(20), &AnalysisOptions::new(2, 0.8))
            .unwrap();
        assert_eq!(analysis.validation.n_folds(), 16);
    }
}
