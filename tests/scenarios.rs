//! End-to-end scenarios across components.

use approx::assert_relative_eq;
use chrono::{Datelike, TimeZone, Utc};
use metric_analytics::prelude::*;
use metric_analytics::simulation::MonteCarloConfig;
use metric_analytics::validation::WalkForwardConfig;
use rand_distr::{Distribution, LogNormal, Normal};
use std::sync::Arc;
use std::time::Duration;

fn scenario_series() -> Vec<DataPoint> {
    vec![
        DataPoint::new(0.0, 100.0),
        DataPoint::new(1.0, 110.0),
        DataPoint::new(2.0, 120.0),
        DataPoint::new(3.0, 130.0),
    ]
}

#[test]
fn linear_growth_scenario() {
    let series = scenario_series();

    let trend = TrendAnalyzer::new().fit(&series).unwrap();
    assert_relative_eq!(trend.slope, 10.0, epsilon = 1e-9);
    assert_relative_eq!(trend.intercept, 100.0, epsilon = 1e-9);
    assert_eq!(trend.direction, TrendDirection::Increasing);

    let forecast = ForecastEngine::new().forecast(&series, 2, 0.95).unwrap();
    assert_eq!(forecast.len(), 2);
    assert_relative_eq!(forecast[0].predicted_value, 140.0, epsilon = 1e-9);
    assert_relative_eq!(forecast[1].predicted_value, 150.0, epsilon = 1e-9);
    for point in &forecast {
        assert!(point.lower < point.predicted_value);
        assert!(point.predicted_value < point.upper);
    }
}

#[test]
fn textbook_line_direction() {
    let values: Vec<f64> = (0..10).map(|x| 2.0 * x as f64 + 5.0).collect();
    let trend = TrendAnalyzer::new().fit_values(&values).unwrap();
    assert_eq!(trend.direction, TrendDirection::Increasing);
    assert_relative_eq!(trend.slope, 2.0, epsilon = 1e-9);
    assert_relative_eq!(trend.intercept, 5.0, epsilon = 1e-9);
}

#[test]
fn boundary_inputs() {
    let analyzer = TrendAnalyzer::new();
    assert!(matches!(
        analyzer.fit(&[]),
        Err(AnalyticsError::InsufficientData { .. })
    ));
    assert!(matches!(
        analyzer.fit(&[DataPoint::new(0.0, 1.0)]),
        Err(AnalyticsError::InsufficientData { .. })
    ));

    let eleven = DataPoint::from_values(&[1.0, 5.0, 1.0, 5.0, 1.0, 5.0, 1.0, 5.0, 1.0, 5.0, 1.0]);
    assert!(SeasonalityDetector::new().detect(&eleven).is_none());

    let three = CrossValidator::new().validate(&scenario_series()[..3]).unwrap();
    assert_eq!(three.accuracy, 0.5);
    assert!(three.historical_predictions.is_empty());
}

#[test]
fn monthly_revenue_report() {
    // Three years of monthly revenue with a December peak.
    let series: Vec<DataPoint> = (0..36)
        .map(|i| {
            let date = Utc
                .with_ymd_and_hms(2021 + i / 12, (i % 12) as u32 + 1, 1, 0, 0, 0)
                .unwrap();
            let month = (i % 12) as f64;
            let seasonal = 40.0 * (std::f64::consts::TAU * (month - 11.0) / 12.0).cos();
            DataPoint::dated(i as f64, 1_000.0 + 8.0 * i as f64 + seasonal, date)
        })
        .collect();

    let engine = AnalyticsEngine::new();
    let analysis = engine
        .analyze(&series, &AnalysisOptions::new(3, 0.9))
        .unwrap();

    assert_eq!(analysis.trend.direction, TrendDirection::Increasing);
    let pattern = analysis.seasonality.expect("yearly cycle");
    assert_eq!(pattern.period, 12);
    assert!((pattern.peak_offset() - 11.0).abs() < 0.5);

    let months: Vec<u32> = analysis
        .forecast
        .iter()
        .filter_map(|p| p.date.map(|d| d.month()))
        .collect();
    assert_eq!(months, vec![1, 2, 3]);
    assert_eq!(analysis.forecast[0].date.map(|d| d.year()), Some(2024));

    assert_eq!(analysis.validation.n_folds(), 33);
    assert!(analysis.validation.accuracy > 0.9);
    assert!(analysis.quality.score > 0.9);
}

#[test]
fn revenue_simulation_through_engine() {
    let config =
        AnalyticsConfig::default().with_monte_carlo(MonteCarloConfig::default().with_seed(2024));
    let engine = AnalyticsEngine::from_config(&config);

    // Units sold times a lognormal price.
    let units = Normal::new(500.0, 50.0).unwrap();
    let price = LogNormal::new(3.0, 0.25).unwrap();

    let revenue = RevenueModel { units, price };
    let result = engine
        .simulator()
        .simulate_distribution(&revenue, 5_000, 50)
        .unwrap();

    let total: f64 = result.distribution.iter().map(|b| b.probability).sum();
    assert_relative_eq!(total, 1.0, epsilon = 1e-9);

    let ci95 = result.interval(0.95).unwrap();
    let median = result.statistics.median;
    assert!(ci95.lower < median && median < ci95.upper);
    // Right-skewed revenue.
    assert!(ci95.upper - median > median - ci95.lower);
    assert!(result.probability_below(median) > 0.45);
}

struct RevenueModel {
    units: Normal<f64>,
    price: LogNormal<f64>,
}

impl Distribution<f64> for RevenueModel {
    fn sample<R: rand::Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        self.units.sample(rng).max(0.0) * self.price.sample(rng)
    }
}

#[test]
fn caches_are_isolated_per_engine() {
    let options = AnalysisOptions::default();
    let series = DataPoint::from_values(&[5.0, 7.0, 6.0, 9.0, 11.0, 10.0, 13.0]);

    let first_cache = Arc::new(ResultCache::new(Duration::from_secs(900)));
    let second_cache = Arc::new(ResultCache::new(Duration::from_secs(900)));
    let first = AnalyticsEngine::new().with_cache(Arc::clone(&first_cache));
    let second = AnalyticsEngine::new().with_cache(Arc::clone(&second_cache));

    let a = first.analyze_cached("orders", &series, &options).unwrap();
    assert_eq!(first_cache.len(), 1);
    assert!(second_cache.is_empty());

    let b = second.analyze_cached("orders", &series, &options).unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!(*a, *b);

    first_cache.clear();
    assert!(first_cache.is_empty());
    assert_eq!(second_cache.len(), 1);
}

#[test]
fn rolling_validation_through_config() {
    let config = AnalyticsConfig::default().with_walk_forward(WalkForwardConfig::rolling(5));
    let engine = AnalyticsEngine::from_config(&config);
    let series = DataPoint::from_values(&(0..20).map(|i| (i * i) as f64).collect::<Vec<_>>());

    let analysis = engine.analyze(&series, &AnalysisOptions::new(1, 0.8)).unwrap();
    assert_eq!(analysis.validation.n_folds(), 15);

    let expanding = AnalyticsEngine::new()
        .analyze(&series, &AnalysisOptions::new(1, 0.8))
        .unwrap();
    // A short window tracks the accelerating series more closely.
    assert!(analysis.validation.mae < expanding.validation.mae);
}
