//! Forward projection of fitted trends.

mod engine;

pub use engine::{ForecastEngine, MIN_FORECAST_POINTS};
