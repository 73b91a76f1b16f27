//! Symmetric value ranges at a stated probability level.

/// A value range expected to contain the true quantity with probability `level`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ConfidenceInterval {
    /// Lower bound.
    pub lower: f64,
    /// Upper bound (never below `lower`).
    pub upper: f64,
    /// Confidence level in (0, 1).
    pub level: f64,
}

impl ConfidenceInterval {
    /// Create an interval, ordering the bounds if they arrive swapped.
    pub fn new(lower: f64, upper: f64, level: f64) -> Self {
        Self {
            lower: lower.min(upper),
            upper: lower.max(upper),
            level,
        }
    }

    /// Interval centred on `center` with half-width `margin`.
    pub fn symmetric(center: f64, margin: f64, level: f64) -> Self {
        let margin = margin.abs();
        Self::new(center - margin, center + margin, level)
    }

    /// Distance between the bounds.
    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }

    /// Centre of the interval.
    pub fn midpoint(&self) -> f64 {
        (self.lower + self.upper) / 2.0
    }

    /// Whether `value` lies within the bounds (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Whether `other` lies entirely within this interval.
    pub fn encloses(&self, other: &ConfidenceInterval) -> bool {
        self.lower <= other.lower && self.upper >= other.upper
    }

    /// Scale the width by `factor` about the midpoint.
    pub fn widen(&self, factor: f64) -> Self {
        Self::symmetric(self.midpoint(), self.width() / 2.0 * factor, self.level)
    }
}
