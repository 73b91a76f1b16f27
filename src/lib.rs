//! # metric-analytics
//!
//! Statistical analytics for business metric time series.
//!
//! Fits linear trends, builds confidence intervals, detects seasonality,
//! backtests trend predictions walk-forward, forecasts with widening
//! prediction bounds, runs Monte Carlo simulations and scores input data
//! quality. [`AnalyticsEngine`](engine::AnalyticsEngine) runs the
//! series-level components in one call and can reuse results through an
//! explicit [`ResultCache`](cache::ResultCache).
//!
//! ```
//! use metric_analytics::prelude::*;
//!
//! let series = DataPoint::from_values(&[100.0, 110.0, 120.0, 130.0]);
//!
//! let trend = TrendAnalyzer::new().fit(&series).unwrap();
//! assert_eq!(trend.direction, TrendDirection::Increasing);
//!
//! let forecast = ForecastEngine::new().forecast(&series, 2, 0.95).unwrap();
//! assert!(forecast.iter().all(|p| p.lower < p.predicted_value && p.predicted_value < p.upper));
//! ```

pub mod analysis;
pub mod cache;
pub mod config;
pub mod core;
pub mod detection;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod simulation;
pub mod utils;
pub mod validation;

pub use error::{AnalyticsError, Result};

pub mod prelude {
    pub use crate::analysis::{ConfidenceEstimator, TrendAnalyzer, TrendDirection, TrendResult};
    pub use crate::cache::{CacheKey, ResultCache};
    pub use crate::config::AnalyticsConfig;
    pub use crate::core::{ConfidenceInterval, DataPoint, ForecastPoint};
    pub use crate::detection::{SeasonalPattern, SeasonalityDetector};
    pub use crate::engine::{AnalysisOptions, AnalyticsEngine, SeriesAnalysis};
    pub use crate::error::{AnalyticsError, Result};
    pub use crate::forecast::ForecastEngine;
    pub use crate::simulation::{MonteCarloConfig, MonteCarloSimulator, SimulationResult};
    pub use crate::validation::{CrossValidationResult, CrossValidator, DataQualityScorer};
}
