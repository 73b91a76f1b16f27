//! Backtesting and input quality checks.
//!
//! # Example
//!
//! ```
//! use metric_analytics::core::DataPoint;
//! use metric_analytics::validation::{CrossValidator, DataQualityScorer};
//!
//! let series = DataPoint::from_values(&[12.0, 14.0, 13.5, 16.0, 17.2, 18.1, 20.4]);
//!
//! let backtest = CrossValidator::new().validate(&series).unwrap();
//! assert_eq!(backtest.historical_predictions.len(), series.len() - 3);
//!
//! let quality = DataQualityScorer::new().score(&series);
//! assert!((0.0..=1.0).contains(&quality));
//! ```

mod cross_validation;
mod quality;

pub use cross_validation::{
    CrossValidationResult, CrossValidator, HistoricalPrediction, WalkForwardConfig,
    WalkForwardStrategy, INSUFFICIENT_DATA_ACCURACY, MIN_VALIDATION_POINTS,
};
pub use quality::{DataQualityScorer, QualityConfig, QualityReport};
