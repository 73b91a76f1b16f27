//! Aggregate configuration for [`AnalyticsEngine`](crate::engine::AnalyticsEngine).

use crate::analysis::TrendConfig;
use crate::detection::SeasonalityConfig;
use crate::simulation::MonteCarloConfig;
use crate::validation::{QualityConfig, WalkForwardConfig};
use std::time::Duration;

/// Default lifetime of cached analysis results.
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(15 * 60);

/// Settings for every component, plus the result cache lifetime.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AnalyticsConfig {
    pub trend: TrendConfig,
    pub seasonality: SeasonalityConfig,
    pub walk_forward: WalkForwardConfig,
    pub monte_carlo: MonteCarloConfig,
    pub quality: QualityConfig,
    /// Lifetime of cached results; also the width of the cache time bucket.
    pub cache_ttl: Duration,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            trend: TrendConfig::default(),
            seasonality: SeasonalityConfig::default(),
            walk_forward: WalkForwardConfig::default(),
            monte_carlo: MonteCarloConfig::default(),
            quality: QualityConfig::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

impl AnalyticsConfig {
    pub fn with_trend(mut self, trend: TrendConfig) -> Self {
        self.trend = trend;
        self
    }

    pub fn with_seasonality(mut self, seasonality: SeasonalityConfig) -> Self {
        self.seasonality = seasonality;
        self
    }

    pub fn with_walk_forward(mut self, walk_forward: WalkForwardConfig) -> Self {
        self.walk_forward = walk_forward;
        self
    }

    pub fn with_monte_carlo(mut self, monte_carlo: MonteCarloConfig) -> Self {
        self.monte_carlo = monte_carlo;
        self
    }

    pub fn with_quality(mut self, quality: QualityConfig) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }
}
