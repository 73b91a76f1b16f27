//! Accuracy metrics for prediction evaluation.

use crate::error::{AnalyticsError, Result};

/// Accuracy metrics for evaluating predictions against observations.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AccuracyMetrics {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error (None if zeros in actual)
    pub mape: Option<f64>,
    /// Mean signed error (`predicted - actual`); positive means over-prediction.
    pub bias: f64,
    /// Mean per-point accuracy score, see [`point_accuracy`].
    pub accuracy: f64,
}

impl AccuracyMetrics {
    /// Metrics for an empty evaluation: no error observed, neutral accuracy.
    pub fn neutral(accuracy: f64) -> Self {
        Self {
            mae: 0.0,
            mse: 0.0,
            rmse: 0.0,
            mape: None,
            bias: 0.0,
            accuracy,
        }
    }
}

/// Accuracy of a single prediction: `max(0, 1 - |error| / |actual|)`.
///
/// A zero actual value counts as the worst case (relative error of 1).
pub fn point_accuracy(actual: f64, predicted: f64) -> f64 {
    let relative_error = if actual == 0.0 {
        1.0
    } else {
        ((predicted - actual) / actual).abs()
    };
    (1.0 - relative_error).max(0.0)
}

/// Calculate accuracy metrics between actual and predicted values.
///
/// # Arguments
/// * `actual` - Actual observed values
/// * `predicted` - Predicted values
///
/// # Returns
/// `AccuracyMetrics` struct with all computed metrics
pub fn calculate_metrics(actual: &[f64], predicted: &[f64]) -> Result<AccuracyMetrics> {
    if actual.is_empty() || predicted.is_empty() {
        return Err(AnalyticsError::insufficient(1, 0));
    }

    if actual.len() != predicted.len() {
        return Err(AnalyticsError::InvalidParameter(format!(
            "length mismatch: {} actual vs {} predicted",
            actual.len(),
            predicted.len()
        )));
    }

    let n = actual.len() as f64;
    let pairs = || actual.iter().zip(predicted.iter());

    let mae = pairs().map(|(a, p)| (a - p).abs()).sum::<f64>() / n;
    let mse = pairs().map(|(a, p)| (a - p).powi(2)).sum::<f64>() / n;
    let bias = pairs().map(|(a, p)| p - a).sum::<f64>() / n;
    let accuracy = pairs().map(|(&a, &p)| point_accuracy(a, p)).sum::<f64>() / n;

    // MAPE (only if no zeros in actual)
    let mape = if actual.contains(&0.0) {
        None
    } else {
        let sum: f64 = pairs().map(|(a, p)| ((a - p) / a).abs()).sum();
        Some(100.0 * sum / n)
    };

    Ok(AccuracyMetrics {
        mae,
        mse,
        rmse: mse.sqrt(),
        mape,
        bias,
        accuracy,
    })
}
