//! Ordinary least squares fit of a straight line.
//!
//! Closed-form simple regression `y = intercept + slope * x`, shared by the
//! trend analyzer and the seasonality detector's detrending step.

use crate::error::{AnalyticsError, Result};

/// A fitted line and its goodness-of-fit statistics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LineFit {
    /// Slope of the fitted line.
    pub slope: f64,
    /// Intercept of the fitted line.
    pub intercept: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
    /// Residual sum of squares.
    pub ss_residual: f64,
    /// Centred sum of squares of `x`.
    pub ss_xx: f64,
    /// `y` shows no variation beyond rounding noise.
    pub constant_y: bool,
    /// Number of observations.
    pub n: usize,
}

impl LineFit {
    /// Evaluate the fitted line at `x`.
    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Residuals `y - fitted` for the given observations.
    pub fn residuals(&self, x: &[f64], y: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(y.iter())
            .map(|(&xi, &yi)| yi - self.predict(xi))
            .collect()
    }
}

/// Fit a line through `(x, y)` pairs.
///
/// `slope = Σ(x-x̄)(y-ȳ) / Σ(x-x̄)²`, `intercept = ȳ - slope·x̄`.
/// A constant `y` is a perfect fit (`r_squared = 1`) and flagged as
/// `constant_y`. Constancy is judged against the rounding noise of `n`
/// squared deviations at the magnitude of the mean.
pub fn fit_line(x: &[f64], y: &[f64]) -> Result<LineFit> {
    let n = y.len();
    if x.len() != n {
        return Err(AnalyticsError::InvalidParameter(format!(
            "x and y lengths differ: {} vs {}",
            x.len(),
            n
        )));
    }
    if n < 2 {
        return Err(AnalyticsError::insufficient(2, n));
    }

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().sum::<f64>() / n as f64;

    let mut ss_xx = 0.0;
    let mut ss_xy = 0.0;
    let mut ss_yy = 0.0;
    for (&xi, &yi) in x.iter().zip(y.iter()) {
        let dx = xi - mean_x;
        let dy = yi - mean_y;
        ss_xx += dx * dx;
        ss_xy += dx * dy;
        ss_yy += dy * dy;
    }

    if ss_xx == 0.0 {
        return Err(AnalyticsError::DegenerateInput(
            "all x values are identical".to_string(),
        ));
    }

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;

    let ss_residual: f64 = x
        .iter()
        .zip(y.iter())
        .map(|(&xi, &yi)| (yi - (intercept + slope * xi)).powi(2))
        .sum();

    let noise = 4.0 * f64::EPSILON * mean_y.abs().max(1.0);
    let constant_y = ss_yy <= n as f64 * noise * noise;
    let r_squared = if constant_y {
        1.0
    } else {
        (1.0 - ss_residual / ss_yy).clamp(0.0, 1.0)
    };

    Ok(LineFit {
        slope,
        intercept,
        r_squared,
        ss_residual,
        ss_xx,
        constant_y,
        n,
    })
}
