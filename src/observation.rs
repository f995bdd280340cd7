use serde::{Deserialize, Serialize};

use crate::Period;

/// A series value.
///
/// Semantic alias for [`f64`]. Documents intent in function signatures
/// without introducing newtype construction overhead.
pub type Value = f64;

/// Identifier of one series in a [`SeriesSet`](crate::SeriesSet), typically a
/// currency or country code.
pub type SeriesId = String;

/// One observation as delivered by the data-fetch layer.
///
/// Implement this on your own parsed record type to avoid per-point
/// conversion. [`SeriesSet::insert`](crate::SeriesSet::insert) accepts any
/// `impl Observation` and keeps only observations whose value is present and
/// finite.
///
/// # Example
///
/// ```
/// use quantedge_chart::{Observation, Value};
///
/// struct StatRow {
///     time: String,
///     data_value: String,
/// }
///
/// impl Observation for StatRow {
///     fn period(&self) -> &str { &self.time }
///     fn value(&self) -> Option<Value> { self.data_value.parse().ok() }
/// }
/// ```
pub trait Observation {
    /// Period key of the observation, e.g. `20240105`.
    fn period(&self) -> &str;

    /// Observed value, or `None` when the source reported none.
    ///
    /// Non-finite values are treated like `None`.
    fn value(&self) -> Option<Value>;
}

/// A single `{period, value}` point of a series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub period: Period,
    pub value: Value,
}

impl DataPoint {
    #[must_use]
    pub fn new(period: impl Into<Period>, value: Value) -> Self {
        Self {
            period: period.into(),
            value,
        }
    }
}

impl Observation for DataPoint {
    #[inline]
    fn period(&self) -> &str {
        self.period.as_str()
    }

    #[inline]
    fn value(&self) -> Option<Value> {
        Some(self.value)
    }
}

impl<P: AsRef<str>> Observation for (P, Value) {
    #[inline]
    fn period(&self) -> &str {
        self.0.as_ref()
    }

    #[inline]
    fn value(&self) -> Option<Value> {
        Some(self.1)
    }
}

impl<P: AsRef<str>> Observation for (P, Option<Value>) {
    #[inline]
    fn period(&self) -> &str {
        self.0.as_ref()
    }

    #[inline]
    fn value(&self) -> Option<Value> {
        self.1
    }
}

impl<P: AsRef<str>> Observation for (P, &str) {
    #[inline]
    fn period(&self) -> &str {
        self.0.as_ref()
    }

    fn value(&self) -> Option<Value> {
        parse_value(self.1)
    }
}

/// Parses a value as statistics APIs print it.
///
/// Accepts surrounding whitespace and `,` thousands separators. Placeholders
/// such as `-`, `..` or an empty string yield `None`.
#[must_use]
pub fn parse_value(raw: &str) -> Option<Value> {
    let raw = raw.trim();
    let parsed: Value = if raw.contains(',') {
        raw.replace(',', "").parse().ok()?
    } else {
        raw.parse().ok()?
    };
    parsed.is_finite().then_some(parsed)
}
