//! Walk-forward validation of trend predictions.
//!
//! Each observation from `min_train` onwards is predicted by a trend fitted
//! only on the observations before it, so no prediction ever sees its own
//! future.

use crate::analysis::TrendAnalyzer;
use crate::core::{validate_series, DataPoint};
use crate::error::{AnalyticsError, Result};
use crate::utils::metrics::{calculate_metrics, point_accuracy, AccuracyMetrics};
use chrono::{DateTime, Utc};

/// Minimum series length for walk-forward validation.
pub const MIN_VALIDATION_POINTS: usize = 4;

/// Accuracy reported when there is too little history to validate.
pub const INSUFFICIENT_DATA_ACCURACY: f64 = 0.5;

/// How the training window moves through the series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WalkForwardStrategy {
    /// Training window grows: every fold trains on all prior observations.
    #[default]
    Expanding,
    /// Training window of fixed length slides forward.
    Rolling { window: usize },
}

/// Configuration for walk-forward validation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WalkForwardConfig {
    /// Number of observations before the first predicted one.
    pub min_train: usize,
    /// Window strategy.
    pub strategy: WalkForwardStrategy,
}

impl Default for WalkForwardConfig {
    fn default() -> Self {
        Self {
            min_train: 3,
            strategy: WalkForwardStrategy::Expanding,
        }
    }
}

impl WalkForwardConfig {
    /// Expanding-window configuration.
    pub fn expanding() -> Self {
        Self::default()
    }

    /// Rolling-window configuration with a fixed training length.
    pub fn rolling(window: usize) -> Self {
        Self {
            min_train: window,
            strategy: WalkForwardStrategy::Rolling { window },
        }
    }

    /// Set the number of observations before the first prediction.
    pub fn with_min_train(mut self, min_train: usize) -> Self {
        self.min_train = min_train;
        self
    }
}

/// One out-of-sample prediction made during validation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoricalPrediction {
    /// Ordinal position of the predicted observation.
    pub x: f64,
    /// Date of the predicted observation, if known.
    pub date: Option<DateTime<Utc>>,
    /// Value predicted from prior observations only.
    pub predicted: f64,
    /// Value actually observed.
    pub actual: f64,
    /// `max(0, 1 - |error| / |actual|)`.
    pub accuracy: f64,
}

impl HistoricalPrediction {
    /// Signed error (`predicted - actual`).
    pub fn error(&self) -> f64 {
        self.predicted - self.actual
    }
}

/// Outcome of walk-forward validation.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CrossValidationResult {
    /// Mean per-point accuracy in `[0, 1]`.
    pub accuracy: f64,
    /// Mean absolute error.
    pub mae: f64,
    /// Root mean squared error.
    pub rmse: f64,
    /// Mean absolute percentage error (None if any actual is zero or no folds ran).
    pub mape: Option<f64>,
    /// Mean signed error.
    pub bias: f64,
    /// Every prediction in chronological order.
    pub historical_predictions: Vec<HistoricalPrediction>,
}

impl CrossValidationResult {
    /// Conservative result for series too short to validate.
    pub fn insufficient() -> Self {
        Self::from_metrics(AccuracyMetrics::neutral(INSUFFICIENT_DATA_ACCURACY), Vec::new())
    }

    fn from_metrics(metrics: AccuracyMetrics, ledger: Vec<HistoricalPrediction>) -> Self {
        Self {
            accuracy: metrics.accuracy,
            mae: metrics.mae,
            rmse: metrics.rmse,
            mape: metrics.mape,
            bias: metrics.bias,
            historical_predictions: ledger,
        }
    }

    /// Number of walk-forward steps evaluated.
    pub fn n_folds(&self) -> usize {
        self.historical_predictions.len()
    }
}

/// Walk-forward backtester for [`TrendAnalyzer`].
#[derive(Debug, Clone, Default)]
pub struct CrossValidator {
    config: WalkForwardConfig,
    analyzer: TrendAnalyzer,
}

impl CrossValidator {
    /// Expanding-window validator with a default trend analyzer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validator with a custom window configuration.
    pub fn with_config(config: WalkForwardConfig) -> Self {
        Self {
            config,
            analyzer: TrendAnalyzer::default(),
        }
    }

    /// Use a specific trend analyzer for each fold.
    pub fn with_analyzer(mut self, analyzer: TrendAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    /// Get the configuration.
    pub fn config(&self) -> &WalkForwardConfig {
        &self.config
    }

    /// Backtest the trend analyzer over `series`.
    ///
    /// Series shorter than [`MIN_VALIDATION_POINTS`] yield
    /// [`CrossValidationResult::insufficient`] rather than an error.
    pub fn validate(&self, series: &[DataPoint]) -> Result<CrossValidationResult> {
        let n = series.len();
        if n < MIN_VALIDATION_POINTS {
            tracing::debug!(n, "series too short for walk-forward validation");
            return Ok(CrossValidationResult::insufficient());
        }
        validate_series(series)?;

        let window = match self.config.strategy {
            WalkForwardStrategy::Expanding => None,
            WalkForwardStrategy::Rolling { window } => Some(window),
        };
        let min_train = self.config.min_train.max(window.unwrap_or(0));
        let smallest_fit = window.unwrap_or(min_train);
        if smallest_fit < 2 {
            return Err(AnalyticsError::InvalidParameter(format!(
                "training window must hold at least 2 observations, got {}",
                smallest_fit
            )));
        }

        let mut ledger = Vec::with_capacity(n.saturating_sub(min_train));
        for i in min_train..n {
            let start = window.map_or(0, |w| i.saturating_sub(w));
            let trend = self.analyzer.fit(&series[start..i])?;
            let target = &series[i];
            let predicted = trend.predict(target.x);
            ledger.push(HistoricalPrediction {
                x: target.x,
                date: target.date,
                predicted,
                actual: target.y,
                accuracy: point_accuracy(target.y, predicted),
            });
        }

        if ledger.is_empty() {
            tracing::debug!(n, min_train, "no walk-forward folds");
            return Ok(CrossValidationResult::insufficient());
        }

        let actual: Vec<f64> = ledger.iter().map(|p| p.actual).collect();
        let predicted: Vec<f64> = ledger.iter().map(|p| p.predicted).collect();
        let metrics = calculate_metrics(&actual, &predicted)?;

        tracing::debug!(
            folds = ledger.len(),
            mae = metrics.mae,
            rmse = metrics.rmse,
            accuracy = metrics.accuracy,
            "walk-forward validation complete"
        );

        Ok(CrossValidationResult::from_metrics(metrics, ledger))
    }
}
