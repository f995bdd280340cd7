use std::{
    borrow::Cow,
    cmp::Ordering,
    fmt::Display,
    sync::LazyLock,
};

use chrono::{Datelike, Months, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::Period;

/// A parsed period: the calendar day a period key starts on.
pub type CalendarInstant = NaiveDate;

/// Four-digit year, optional `Q` marker, quarter 1-4.
static QUARTER_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4})[Qq]?([1-4])$").expect("quarter key pattern is valid")
});

/// Reporting frequency of a time series.
///
/// The cadence fixes the shape of period keys and how they are parsed,
/// compared and labeled. It is set once per chart.
#[derive(PartialEq, Eq, Hash, Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cadence {
    /// `YYYYMMDD`, e.g. exchange and interest rates.
    Daily,
    /// `YYYYMM`, e.g. trade and employment figures.
    Monthly,
    /// `YYYYQn` (`YYYYn` accepted on input), e.g. GDP.
    Quarterly,
    /// `YYYY`.
    Annual,
}

impl Display for Cadence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Daily => "daily",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
        })
    }
}

impl Cadence {
    /// Parses a period key into the calendar day it starts on.
    ///
    /// Returns `None` for any key that does not have this cadence's exact
    /// shape or names an impossible date (`20240230`).
    ///
    /// # Example
    ///
    /// ```
    /// use quantedge_chart::Cadence;
    /// use chrono::NaiveDate;
    ///
    /// assert_eq!(
    ///     Cadence::Quarterly.parse_period("2024Q3"),
    ///     NaiveDate::from_ymd_opt(2024, 7, 1),
    /// );
    /// assert_eq!(Cadence::Monthly.parse_period("2024-03"), None);
    /// ```
    #[must_use]
    pub fn parse_period(self, raw: &str) -> Option<CalendarInstant> {
        match self {
            Self::Daily => {
                let raw = fixed_digits(raw, 8)?;
                NaiveDate::from_ymd_opt(
                    raw[..4].parse().ok()?,
                    raw[4..6].parse().ok()?,
                    raw[6..].parse().ok()?,
                )
            }
            Self::Monthly => {
                let raw = fixed_digits(raw, 6)?;
                NaiveDate::from_ymd_opt(raw[..4].parse().ok()?, raw[4..].parse().ok()?, 1)
            }
            Self::Quarterly => {
                let caps = QUARTER_KEY.captures(raw)?;
                let year = caps[1].parse().ok()?;
                let quarter: u32 = caps[2].parse().ok()?;
                NaiveDate::from_ymd_opt(year, (quarter - 1) * 3 + 1, 1)
            }
            Self::Annual => {
                let raw = fixed_digits(raw, 4)?;
                NaiveDate::from_ymd_opt(raw.parse().ok()?, 1, 1)
            }
        }
    }

    /// Orders two period keys chronologically.
    ///
    /// When either key fails to parse, falls back to ordinal string
    /// comparison of the raw keys. For fixed-width keys of one cadence the
    /// fallback still agrees with calendar order; for anything else it is
    /// only approximate. Keys naming the same instant (`2024Q1` and
    /// `20241`) are ordered by their raw text so the order stays total.
    #[must_use]
    pub fn compare_periods(self, a: &str, b: &str) -> Ordering {
        match (self.parse_period(a), self.parse_period(b)) {
            (Some(lhs), Some(rhs)) => lhs.cmp(&rhs).then_with(|| a.cmp(b)),
            _ => a.cmp(b),
        }
    }

    /// Short axis label: `MM.DD`, `YY.MM`, `YYQn`, or the year unchanged.
    ///
    /// Labels are for display only, never for comparison. Unparsable keys
    /// are returned as-is.
    #[must_use]
    pub fn format_label(self, raw: &str) -> String {
        let Some(date) = self.parse_period(raw) else {
            return raw.to_owned();
        };

        match self {
            Self::Daily => date.format("%m.%d").to_string(),
            Self::Monthly => date.format("%y.%m").to_string(),
            Self::Quarterly => format!("{}Q{}", date.format("%y"), quarter_of(date)),
            Self::Annual => raw.to_owned(),
        }
    }

    /// Long label for tooltip headers: `YYYY.MM.DD`, `YYYY.MM`, `YYYY Qn`,
    /// `YYYY`. Unparsable keys are returned as-is.
    #[must_use]
    pub fn format_full(self, raw: &str) -> String {
        let Some(date) = self.parse_period(raw) else {
            return raw.to_owned();
        };

        match self {
            Self::Daily => date.format("%Y.%m.%d").to_string(),
            Self::Monthly => date.format("%Y.%m").to_string(),
            Self::Quarterly => format!("{} Q{}", date.year(), quarter_of(date)),
            Self::Annual => date.format("%Y").to_string(),
        }
    }

    /// Canonical key of the period containing `date`.
    #[must_use]
    pub fn key(self, date: CalendarInstant) -> Period {
        let raw = match self {
            Self::Daily => date.format("%Y%m%d").to_string(),
            Self::Monthly => date.format("%Y%m").to_string(),
            Self::Quarterly => format!("{:04}Q{}", date.year(), quarter_of(date)),
            Self::Annual => format!("{:04}", date.year()),
        };
        Period::new(raw)
    }

    /// Start of the period following the one starting at `date`.
    ///
    /// `None` only past the end of the representable calendar.
    #[must_use]
    pub fn step(self, date: CalendarInstant) -> Option<CalendarInstant> {
        match self {
            Self::Daily => date.succ_opt(),
            Self::Monthly => date.checked_add_months(Months::new(1)),
            Self::Quarterly => date.checked_add_months(Months::new(3)),
            Self::Annual => date.checked_add_months(Months::new(12)),
        }
    }
}

/// Whole days from `start` to `end` (negative when `end` is earlier).
#[inline]
#[must_use]
pub fn days_between(start: CalendarInstant, end: CalendarInstant) -> i64 {
    end.signed_duration_since(start).num_days()
}

/// Cadence-free spelling of a raw key: quarter keys written `20241` or
/// `2024q1` become `2024Q1`, everything else is returned as is.
///
/// No other cadence has a five or six character key matching the quarter
/// shape, so this never merges periods of different cadences.
pub(crate) fn ingest_key(raw: &str) -> Cow<'_, str> {
    match QUARTER_KEY.captures(raw) {
        Some(caps) if !raw.contains('Q') || raw.len() != 6 => {
            Cow::Owned(format!("{}Q{}", &caps[1], &caps[2]))
        }
        _ => Cow::Borrowed(raw),
    }
}

#[inline]
pub(crate) fn quarter_of(date: CalendarInstant) -> u32 {
    date.month0() / 3 + 1
}

fn fixed_digits(raw: &str, len: usize) -> Option<&str> {
    (raw.len() == len && raw.bytes().all(|b| b.is_ascii_digit())).then_some(raw)
}
