//! Core data structures for metric series analysis.

mod forecast;
mod interval;
mod series;

pub use forecast::ForecastPoint;
pub use interval::ConfidenceInterval;
pub use series::{infer_cadence, positions, validate_series, values, Cadence, DataPoint};
