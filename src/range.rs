use std::{
    fmt::Display,
    hash::{Hash, Hasher},
};

use serde::{Deserialize, Serialize};

use crate::{AlignedFrame, Error, Value};

/// A finite, non-negative `f64` used for range tuning knobs.
///
/// Implements `Eq` and `Hash` via bit-level comparison, which is safe because
/// NaN is rejected at construction.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct NonNegative(f64);

impl NonNegative {
    /// # Panics
    ///
    /// Panics if `value` is negative, infinite or NaN.
    #[must_use]
    pub fn new(value: f64) -> Self {
        assert!(value.is_finite(), "value must be finite");
        assert!(value >= 0.0, "value must not be negative");
        Self(value)
    }

    #[inline]
    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl TryFrom<f64> for NonNegative {
    type Error = Error;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(Error::InvalidNumber { value })
        }
    }
}

impl From<NonNegative> for f64 {
    fn from(value: NonNegative) -> Self {
        value.0
    }
}

impl PartialEq for NonNegative {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for NonNegative {}

impl Hash for NonNegative {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state);
    }
}

/// Padded vertical bounds used to scale a chart.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisplayRange {
    pub min: Value,
    pub max: Value,
}

impl DisplayRange {
    /// Range over the values of every series on `frame`.
    ///
    /// Align only the active series before calling this: hidden series must
    /// not stretch the axis.
    #[must_use]
    pub fn for_frame(frame: &AlignedFrame, config: &RangeConfig) -> Option<Self> {
        config.compute(frame.values())
    }

    /// `max - min`, or `1.0` for a degenerate range.
    #[inline]
    #[must_use]
    pub fn span(&self) -> Value {
        let span = self.max - self.min;
        if span > 0.0 { span } else { 1.0 }
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, value: Value) -> bool {
        (self.min..=self.max).contains(&value)
    }
}

impl Display for DisplayRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// Configuration for display range computation.
///
/// Padding is a fraction of the data range chosen by its magnitude. The
/// defaults are tuned for exchange rates, interest rates and indices:
///
/// | data range   | padding |
/// |--------------|---------|
/// | `> 1000`     | 0.3%    |
/// | `> 100`      | 0.5%    |
/// | otherwise    | 1%      |
///
/// With the zero floor enabled, a padded minimum that dips below zero is
/// clamped to zero (and the clipped amount added to the top) when the data
/// itself is non-negative and its minimum lies within the bottom
/// `zero_band` fraction of the range. Genuinely negative data, such as a
/// trade deficit, keeps its negative axis.
///
/// # Example
///
/// ```
/// use quantedge_chart::RangeConfig;
///
/// let range = RangeConfig::default().compute([0.5, 3.5]).unwrap();
/// assert_eq!(range.min, 0.0);
/// assert!(range.max > 3.5);
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeConfig {
    large_range: NonNegative,
    large_padding: NonNegative,
    medium_range: NonNegative,
    medium_padding: NonNegative,
    small_padding: NonNegative,
    zero_floor: bool,
    zero_band: NonNegative,
}

impl Default for RangeConfig {
    fn default() -> Self {
        Self {
            large_range: NonNegative(1000.0),
            large_padding: NonNegative(0.003),
            medium_range: NonNegative(100.0),
            medium_padding: NonNegative(0.005),
            small_padding: NonNegative(0.01),
            zero_floor: true,
            zero_band: NonNegative(0.1),
        }
    }
}

impl RangeConfig {
    /// Returns a builder starting from the defaults.
    #[must_use]
    pub fn builder() -> RangeConfigBuilder {
        RangeConfigBuilder::new()
    }

    /// Defaults without the zero floor, for series that may go negative.
    #[must_use]
    pub fn signed() -> Self {
        Self::builder().zero_floor(false).build()
    }

    #[inline]
    #[must_use]
    pub fn zero_floor(&self) -> bool {
        self.zero_floor
    }

    /// Padding fraction for a data range of magnitude `range`.
    #[inline]
    #[must_use]
    pub fn padding_for(&self, range: Value) -> f64 {
        if range > self.large_range.value() {
            self.large_padding.value()
        } else if range > self.medium_range.value() {
            self.medium_padding.value()
        } else {
            self.small_padding.value()
        }
    }

    /// Computes the padded range of `values`.
    ///
    /// Pass only values of visible series. Non-finite values are ignored;
    /// returns `None` when nothing is left.
    #[must_use]
    pub fn compute(&self, values: impl IntoIterator<Item = Value>) -> Option<DisplayRange> {
        let (min, max) = values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc: Option<(Value, Value)>, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })?;

        let raw = max - min;
        let range = if raw > 0.0 { raw } else { 1.0 };
        let pad = range * self.padding_for(raw);

        let (mut lo, mut hi) = (min - pad, max + pad);

        if self.zero_floor && lo < 0.0 && min >= 0.0 && min <= range * self.zero_band.value() {
            hi -= lo;
            lo = 0.0;
        }

        Some(DisplayRange { min: lo, max: hi })
    }
}

impl Display for RangeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RangeConfig({}@{}, {}@{}, {}, floor: {})",
            self.large_padding.value(),
            self.large_range.value(),
            self.medium_padding.value(),
            self.medium_range.value(),
            self.small_padding.value(),
            self.zero_floor,
        )
    }
}

/// Builder for [`RangeConfig`].
///
/// Starts from [`RangeConfig::default`].
pub struct RangeConfigBuilder {
    config: RangeConfig,
}

impl RangeConfigBuilder {
    fn new() -> Self {
        Self {
            config: RangeConfig::default(),
        }
    }

    /// Padding used when the data range exceeds `range`.
    ///
    /// # Panics
    ///
    /// Panics if either argument is negative, infinite or NaN.
    #[inline]
    #[must_use]
    pub fn large(mut self, range: f64, padding: f64) -> Self {
        self.config.large_range = NonNegative::new(range);
        self.config.large_padding = NonNegative::new(padding);
        self
    }

    /// Padding used when the data range exceeds `range` but not the large
    /// threshold.
    ///
    /// # Panics
    ///
    /// Panics if either argument is negative, infinite or NaN.
    #[inline]
    #[must_use]
    pub fn medium(mut self, range: f64, padding: f64) -> Self {
        self.config.medium_range = NonNegative::new(range);
        self.config.medium_padding = NonNegative::new(padding);
        self
    }

    /// Padding for all smaller ranges.
    ///
    /// # Panics
    ///
    /// Panics if `padding` is negative, infinite or NaN.
    #[inline]
    #[must_use]
    pub fn small(mut self, padding: f64) -> Self {
        self.config.small_padding = NonNegative::new(padding);
        self
    }

    #[inline]
    #[must_use]
    pub fn zero_floor(mut self, enabled: bool) -> Self {
        self.config.zero_floor = enabled;
        self
    }

    /// Fraction of the range the minimum must fall within for the zero
    /// floor to apply.
    ///
    /// # Panics
    ///
    /// Panics if `band` is negative, infinite or NaN.
    #[inline]
    #[must_use]
    pub fn zero_band(mut self, band: f64) -> Self {
        self.config.zero_band = NonNegative::new(band);
        self
    }

    /// # Panics
    ///
    /// Panics if the medium threshold exceeds the large one.
    #[must_use]
    pub fn build(self) -> RangeConfig {
        assert!(
            self.config.medium_range.value() <= self.config.large_range.value(),
            "medium range threshold must not exceed the large one"
        );
        self.config
    }
}
