//! Trend fitting and interval estimation.

mod confidence;
mod trend;

pub use confidence::ConfidenceEstimator;
pub use trend::{TrendAnalyzer, TrendConfig, TrendDirection, TrendResult, MIN_TREND_POINTS};
