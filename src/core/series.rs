//! Observation type and series-level helpers.

use crate::error::{AnalyticsError, Result};
use chrono::{DateTime, Duration, Months, Utc};
use std::collections::BTreeMap;

/// A single observation of a metric.
///
/// `x` is the ordinal position in the series; within one series `x` is
/// strictly increasing and dates (when present) never go backwards.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DataPoint {
    /// Ordinal index.
    pub x: f64,
    /// Observed value.
    pub y: f64,
    /// Optional timestamp of the observation.
    pub date: Option<DateTime<Utc>>,
}

impl DataPoint {
    /// Create an undated observation.
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y, date: None }
    }

    /// Create a dated observation.
    pub fn dated(x: f64, y: f64, date: DateTime<Utc>) -> Self {
        Self {
            x,
            y,
            date: Some(date),
        }
    }

    /// Build an ordinal series (`x = 0, 1, 2, ...`) from raw values.
    pub fn from_values(values: &[f64]) -> Vec<DataPoint> {
        values
            .iter()
            .enumerate()
            .map(|(i, &y)| DataPoint::new(i as f64, y))
            .collect()
    }
}

/// Extract the observed values of a series.
pub fn values(series: &[DataPoint]) -> Vec<f64> {
    series.iter().map(|p| p.y).collect()
}

/// Extract the ordinal positions of a series.
pub fn positions(series: &[DataPoint]) -> Vec<f64> {
    series.iter().map(|p| p.x).collect()
}

/// Check the ordering and finiteness invariants of a series.
pub fn validate_series(series: &[DataPoint]) -> Result<()> {
    if let Some(i) = series
        .iter()
        .position(|p| !p.x.is_finite() || !p.y.is_finite())
    {
        return Err(AnalyticsError::InvalidSeries(format!(
            "non-finite observation at index {}",
            i
        )));
    }

    if let Some(i) = series.windows(2).position(|w| w[1].x <= w[0].x) {
        return Err(AnalyticsError::InvalidSeries(format!(
            "x must be strictly increasing (index {})",
            i + 1
        )));
    }

    let mut last_date: Option<DateTime<Utc>> = None;
    for (i, point) in series.iter().enumerate() {
        if let Some(date) = point.date {
            if matches!(last_date, Some(prev) if date < prev) {
                return Err(AnalyticsError::InvalidSeries(format!(
                    "dates must be non-decreasing (index {})",
                    i
                )));
            }
            last_date = Some(date);
        }
    }

    Ok(())
}

/// Sampling cadence of a dated series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Calendar months between observations (1 = monthly, 3 = quarterly, 12 = yearly).
    Months(u32),
    /// Fixed wall-clock spacing.
    Fixed(Duration),
}

impl Cadence {
    /// Project `date` forward by `steps` sampling intervals.
    ///
    /// Returns `None` if the result falls outside the representable range.
    pub fn advance(&self, date: DateTime<Utc>, steps: u32) -> Option<DateTime<Utc>> {
        match *self {
            Cadence::Months(months) => {
                date.checked_add_months(Months::new(months.checked_mul(steps)?))
            }
            Cadence::Fixed(spacing) => {
                let total = spacing.checked_mul(i32::try_from(steps).ok()?)?;
                date.checked_add_signed(total)
            }
        }
    }

    /// Encode as an ordered key: months are negative, fixed spacing is seconds.
    fn key(&self) -> i64 {
        match *self {
            Cadence::Months(months) => -i64::from(months),
            Cadence::Fixed(spacing) => spacing.num_seconds().max(0),
        }
    }

    fn from_key(key: i64) -> Self {
        if key < 0 {
            Cadence::Months(key.unsigned_abs() as u32)
        } else {
            Cadence::Fixed(Duration::seconds(key))
        }
    }

    /// Classify a single gap between consecutive timestamps.
    fn classify(gap: Duration) -> Self {
        match gap.num_days() {
            28..=31 => Cadence::Months(1),
            89..=92 => Cadence::Months(3),
            365..=366 => Cadence::Months(12),
            _ => Cadence::Fixed(gap),
        }
    }
}

/// Infer the sampling cadence from the dated points of a series.
///
/// Each gap is classified (month-like gaps snap to calendar months) and the
/// modal class wins, provided it covers at least `tolerance` of all gaps.
/// Returns `None` when fewer than two points carry dates, when no class is
/// dominant, or when the modal gap is zero.
pub fn infer_cadence(series: &[DataPoint], tolerance: f64) -> Option<Cadence> {
    let dates: Vec<DateTime<Utc>> = series.iter().filter_map(|p| p.date).collect();
    if dates.len() < 2 {
        return None;
    }

    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for w in dates.windows(2) {
        *counts.entry(Cadence::classify(w[1] - w[0]).key()).or_insert(0) += 1;
    }

    let mut modal: Option<(i64, usize)> = None;
    for (&key, &count) in &counts {
        if modal.map_or(true, |(_, best)| count > best) {
            modal = Some((key, count));
        }
    }
    let (key, count) = modal?;

    let total = dates.len() - 1;
    if (count as f64 / total as f64) < tolerance || key == 0 {
        return None;
    }

    Some(Cadence::from_key(key))
}
