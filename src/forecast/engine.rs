//! Trend extrapolation with widening prediction bounds.

use crate::analysis::{ConfidenceEstimator, TrendAnalyzer, TrendResult};
use crate::core::{infer_cadence, DataPoint, ForecastPoint};
use crate::error::{AnalyticsError, Result};
use crate::utils::stats::z_score;

/// Minimum number of observations required to forecast.
pub const MIN_FORECAST_POINTS: usize = 3;

/// Share of date gaps that must agree before a cadence is extrapolated.
const CADENCE_TOLERANCE: f64 = 0.5;

/// Projects the fitted trend of a series forward.
///
/// Step `k` sits at `x = last_x + k` and its interval is the spread-based
/// interval of the series scaled by `sqrt(k)`, so uncertainty compounds with
/// distance from the data.
///
/// # Example
///
/// ```
/// use metric_analytics::core::DataPoint;
/// use metric_analytics::forecast::ForecastEngine;
///
/// let series = DataPoint::from_values(&[100.0, 110.0, 120.0, 130.0]);
/// let points = ForecastEngine::new().forecast(&series, 2, 0.95).unwrap();
///
/// assert_eq!(points.len(), 2);
/// assert!((points[0].predicted_value - 140.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct ForecastEngine {
    trend: TrendAnalyzer,
    confidence: ConfidenceEstimator,
}

impl ForecastEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forecast with a specific trend analyzer.
    pub fn with_analyzer(trend: TrendAnalyzer) -> Self {
        Self {
            trend,
            confidence: ConfidenceEstimator::new(),
        }
    }

    /// Forecast `horizon` steps past the end of `series`.
    ///
    /// # Errors
    /// * `InvalidParameter` for a zero horizon or a level outside `(0, 1)`.
    /// * `InsufficientData` for fewer than [`MIN_FORECAST_POINTS`] points.
    /// * Any error raised by fitting the trend.
    pub fn forecast(
        &self,
        series: &[DataPoint],
        horizon: usize,
        level: f64,
    ) -> Result<Vec<ForecastPoint>> {
        self.forecast_with_trend(series, horizon, level)
            .map(|(_, points)| points)
    }

    /// Like [`forecast`](Self::forecast), also returning the fitted trend.
    pub fn forecast_with_trend(
        &self,
        series: &[DataPoint],
        horizon: usize,
        level: f64,
    ) -> Result<(TrendResult, Vec<ForecastPoint>)> {
        if horizon == 0 {
            return Err(AnalyticsError::InvalidParameter(
                "horizon must be at least 1".to_string(),
            ));
        }
        z_score(level)?;
        let n = series.len();
        if n < MIN_FORECAST_POINTS {
            return Err(AnalyticsError::insufficient(MIN_FORECAST_POINTS, n));
        }

        let trend = self.trend.fit(series)?;
        let last = series[n - 1];
        let cadence = infer_cadence(series, CADENCE_TOLERANCE);

        let mut points = Vec::with_capacity(horizon);
        for step in 1..=horizon {
            let x = last.x + step as f64;
            let predicted = trend.predict(x);
            let interval = self
                .confidence
                .interval(series, predicted, level)?
                .widen((step as f64).sqrt());

            let date = match (last.date, cadence) {
                (Some(anchor), Some(cadence)) => u32::try_from(step)
                    .ok()
                    .and_then(|steps| cadence.advance(anchor, steps)),
                _ => None,
            };

            points.push(ForecastPoint {
                step,
                x,
                date,
                predicted_value: predicted,
                lower: interval.lower,
                upper: interval.upper,
                confidence_level: level,
            });
        }

        tracing::debug!(
            n,
            horizon,
            level,
            slope = trend.slope,
            dated = cadence.is_some(),
            "forecast generated"
        );

        Ok((trend, points))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Cadence;
    use approx::assert_relative_eq;
    use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};

    fn scenario() -> Vec<DataPoint> {
        DataPoint::from_values(&[100.0, 110.0, 120.0, 130.0])
    }

    fn month_start(year: i32, month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn extends_linear_series() {
        let points = ForecastEngine::new().forecast(&scenario(), 2, 0.95).unwrap();
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0].predicted_value, 140.0, epsilon = 1e-9);
        assert_relative_eq!(points[1].predicted_value, 150.0, epsilon = 1e-9);
        for p in &points {
            assert!(p.lower < p.predicted_value && p.predicted_value < p.upper);
            assert_eq!(p.confidence_level, 0.95);
        }
        assert_eq!(points[0].step, 1);
        assert_eq!(points[1].x, 5.0);
    }

    #[test]
    fn width_grows_with_sqrt_of_step() {
        let series = DataPoint::from_values(&[3.0, 5.0, 4.0, 8.0, 7.0, 9.0]);
        let points = ForecastEngine::new().forecast(&series, 6, 0.95).unwrap();
        let base = points[0].width();
        for p in &points {
            assert_relative_eq!(p.width(), base * (p.step as f64).sqrt(), epsilon = 1e-9);
        }
        assert!(points[5].width() >= points[0].width());
    }

    #[test]
    fn forecast_with_trend_matches_fit() {
        let (trend, points) = ForecastEngine::new()
            .forecast_with_trend(&scenario(), 3, 0.9)
            .unwrap();
        assert_relative_eq!(trend.slope, 10.0, epsilon = 1e-9);
        assert_relative_eq!(points[2].predicted_value, trend.predict(6.0), epsilon = 1e-12);
    }

    #[test]
    fn parameters_are_checked_before_data() {
        let engine = ForecastEngine::new();
        assert!(matches!(
            engine.forecast(&[], 0, 0.95),
            Err(AnalyticsError::InvalidParameter(_))
        ));
        assert!(matches!(
            engine.forecast(&[], 3, 1.5),
            Err(AnalyticsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn needs_three_points() {
        let series = DataPoint::from_values(&[1.0, 2.0]);
        assert_eq!(
            ForecastEngine::new().forecast(&series, 1, 0.95).unwrap_err(),
            AnalyticsError::InsufficientData { needed: 3, got: 2 }
        );
    }

    #[test]
    fn monthly_dates_are_extrapolated() {
        let series: Vec<DataPoint> = (1..=6)
            .map(|m| DataPoint::dated(m as f64, 10.0 * m as f64, month_start(2024, m)))
            .collect();
        let points = ForecastEngine::new().forecast(&series, 3, 0.8).unwrap();
        let months: Vec<u32> = points
            .iter()
            .map(|p| p.date.map(|d| d.month()).unwrap_or(0))
            .collect();
        assert_eq!(months, vec![7, 8, 9]);
    }

    #[test]
    fn daily_dates_are_extrapolated() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        let series: Vec<DataPoint> = (0..5)
            .map(|i| DataPoint::dated(i as f64, i as f64 * 2.0 + 1.0, start + Duration::days(i)))
            .collect();
        assert_eq!(
            infer_cadence(&series, 0.5),
            Some(Cadence::Fixed(Duration::days(1)))
        );
        let points = ForecastEngine::new().forecast(&series, 2, 0.9).unwrap();
        assert_eq!(points[0].date, Some(start + Duration::days(5)));
        assert_eq!(points[1].date, Some(start + Duration::days(6)));
    }

    #[test]
    fn undated_series_gives_undated_forecast() {
        let points = ForecastEngine::new().forecast(&scenario(), 2, 0.95).unwrap();
        assert!(points.iter().all(|p| p.date.is_none()));
    }

    #[test]
    fn forecast_is_deterministic() {
        let engine = ForecastEngine::new();
        let series = DataPoint::from_values(&[4.0, 9.0, 7.5, 12.0, 11.0]);
        assert_eq!(
            engine.forecast(&series, 4, 0.9).unwrap(),
            engine.forecast(&series, 4, 0.9).unwrap()
        );
    }
}
