use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::{Cadence, RangeConfig, SeriesId};

/// Everything that distinguishes one indicator chart from another.
///
/// A profile names the cadence of its series, the unit for labels, the
/// series shown initially, whether daily gaps are carried forward and how
/// the vertical range is padded. Profiles are value types: cheap to clone,
/// compare and hash, and loadable from configuration files.
///
/// An empty `series` list means every series handed to a refresh is shown.
///
/// # Example
///
/// ```
/// use quantedge_chart::{Cadence, ChartProfile};
///
/// let profile = ChartProfile::builder()
///     .name("policy rate")
///     .cadence(Cadence::Monthly)
///     .unit("%")
///     .series(["base", "overnight"])
///     .build();
///
/// assert_eq!(profile.cadence(), Cadence::Monthly);
/// assert_eq!(profile.series(), ["base", "overnight"]);
/// assert!(!profile.gap_fill());
/// ```
#[derive(PartialEq, Eq, Hash, Clone, Debug, Serialize, Deserialize)]
pub struct ChartProfile {
    name: String,
    cadence: Cadence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    unit: Option<String>,
    #[serde(default)]
    series: Vec<SeriesId>,
    #[serde(default)]
    gap_fill: bool,
    #[serde(default)]
    range: RangeConfig,
}

impl ChartProfile {
    /// Returns a new builder with default values.
    #[must_use]
    pub fn builder() -> ChartProfileBuilder {
        ChartProfileBuilder::new()
    }

    /// Daily exchange rates, weekends and holidays carried forward.
    #[must_use]
    pub fn exchange_rates() -> Self {
        Self::builder()
            .name("exchange rates")
            .cadence(Cadence::Daily)
            .unit("KRW")
            .gap_fill(true)
            .build()
    }

    /// Daily market interest rates, non-trading days carried forward.
    #[must_use]
    pub fn interest_rates() -> Self {
        Self::builder()
            .name("interest rates")
            .cadence(Cadence::Daily)
            .unit("%")
            .gap_fill(true)
            .build()
    }

    /// Quarterly GDP growth. Growth turns negative in recessions.
    #[must_use]
    pub fn gdp() -> Self {
        Self::builder()
            .name("gdp")
            .cadence(Cadence::Quarterly)
            .unit("%")
            .range(RangeConfig::signed())
            .build()
    }

    /// Monthly trade balance, which is negative in deficit months.
    #[must_use]
    pub fn trade_balance() -> Self {
        Self::builder()
            .name("trade balance")
            .cadence(Cadence::Monthly)
            .unit("USD mn")
            .range(RangeConfig::signed())
            .build()
    }

    /// Monthly employment figures.
    #[must_use]
    pub fn employment() -> Self {
        Self::builder()
            .name("employment")
            .cadence(Cadence::Monthly)
            .unit("thousand persons")
            .build()
    }

    /// Generic annual statistics.
    #[must_use]
    pub fn annual() -> Self {
        Self::builder()
            .name("annual")
            .cadence(Cadence::Annual)
            .build()
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    #[inline]
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    /// Series shown before the user toggles anything.
    #[inline]
    #[must_use]
    pub fn series(&self) -> &[SeriesId] {
        &self.series
    }

    #[inline]
    #[must_use]
    pub fn gap_fill(&self) -> bool {
        self.gap_fill
    }

    #[inline]
    #[must_use]
    pub fn range(&self) -> &RangeConfig {
        &self.range
    }
}

impl Display for ChartProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ChartProfile({}, {}", self.name, self.cadence)?;
        if let Some(unit) = &self.unit {
            write!(f, ", {unit}")?;
        }
        if self.gap_fill {
            f.write_str(", gap-filled")?;
        }
        f.write_str(")")
    }
}

/// Builder for [`ChartProfile`].
///
/// Defaults: no unit, every series shown, no gap-fill,
/// [`RangeConfig::default`]. The name defaults to the cadence name.
/// Cadence must be set before calling [`build`](Self::build).
pub struct ChartProfileBuilder {
    name: Option<String>,
    cadence: Option<Cadence>,
    unit: Option<String>,
    series: Vec<SeriesId>,
    gap_fill: bool,
    range: RangeConfig,
}

impl ChartProfileBuilder {
    fn new() -> Self {
        Self {
            name: None,
            cadence: None,
            unit: None,
            series: Vec::new(),
            gap_fill: false,
            range: RangeConfig::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name.replace(name.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn cadence(mut self, cadence: Cadence) -> Self {
        self.cadence.replace(cadence);
        self
    }

    #[inline]
    #[must_use]
    pub fn unit(mut self, unit: impl Into<String>) -> Self {
        self.unit.replace(unit.into());
        self
    }

    /// Initially visible series, in legend order. Duplicates are dropped.
    #[must_use]
    pub fn series<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<SeriesId>,
    {
        for id in ids {
            let id = id.into();
            if !self.series.contains(&id) {
                self.series.push(id);
            }
        }
        self
    }

    /// Carry the last actual value forward through periods without an
    /// observation, across the requested span.
    #[inline]
    #[must_use]
    pub fn gap_fill(mut self, enabled: bool) -> Self {
        self.gap_fill = enabled;
        self
    }

    #[inline]
    #[must_use]
    pub fn range(mut self, range: RangeConfig) -> Self {
        self.range = range;
        self
    }

    /// # Panics
    ///
    /// Panics if the cadence was not set.
    #[must_use]
    pub fn build(self) -> ChartProfile {
        let cadence = self.cadence.expect("cadence is required");
        ChartProfile {
            name: self.name.unwrap_or_else(|| cadence.to_string()),
            cadence,
            unit: self.unit,
            series: self.series,
            gap_fill: self.gap_fill,
            range: self.range,
        }
    }
}
