//! Numeric helpers shared by the analysis components.

pub mod metrics;
pub mod ols;
pub mod stats;

pub use metrics::{calculate_metrics, point_accuracy, AccuracyMetrics};
pub use ols::{fit_line, LineFit};
pub use stats::z_score;
