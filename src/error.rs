//! Error types for the metric-analytics library.

use thiserror::Error;

/// Result type alias for analytics operations.
pub type Result<T> = std::result::Result<T, AnalyticsError>;

/// Errors that can occur during analytics operations.
///
/// Soft insufficiency (too little history for seasonality or walk-forward
/// validation) is not an error; those components return `None` or a
/// conservative default instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalyticsError {
    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Input is numerically unfit for the computation.
    #[error("degenerate input: {0}")]
    DegenerateInput(String),

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Series violates ordering or finiteness requirements.
    #[error("invalid series: {0}")]
    InvalidSeries(String),

    /// Computation error (e.g., distribution construction failed).
    #[error("computation error: {0}")]
    Computation(String),
}

impl AnalyticsError {
    /// Shorthand for [`AnalyticsError::InsufficientData`].
    pub(crate) fn insufficient(needed: usize, got: usize) -> Self {
        Self::InsufficientData { needed, got }
    }
}
