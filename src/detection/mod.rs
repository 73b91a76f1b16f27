//! Detection of periodic structure in metric series.

mod seasonality;

pub use seasonality::{
    SeasonalPattern, SeasonalityConfig, SeasonalityDetector, MIN_SEASONAL_OBSERVATIONS,
};
