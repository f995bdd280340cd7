use std::{
    collections::BTreeMap,
    fmt::Display,
};

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::{Cadence, CalendarInstant, Period, cadence::days_between};

/// The period range a chart was asked to show.
///
/// The span may be wider or narrower than the data actually returned. An
/// optional end override (for example "today") replaces `end` when sizing
/// tick density, so a still-loading tail does not change the label layout.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestedSpan {
    pub start: Period,
    pub end: Period,
    #[serde(default)]
    pub end_override: Option<Period>,
}

impl RequestedSpan {
    #[must_use]
    pub fn new(start: impl Into<Period>, end: impl Into<Period>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            end_override: None,
        }
    }

    #[must_use]
    pub fn with_end_override(mut self, end: impl Into<Period>) -> Self {
        self.end_override = Some(end.into());
        self
    }

    /// The override when present, `end` otherwise.
    #[inline]
    #[must_use]
    pub fn effective_end(&self) -> &Period {
        self.end_override.as_ref().unwrap_or(&self.end)
    }
}

/// Label density class, chosen by span length in days.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpanClass {
    /// Up to 7 days: every period, short label (`MM.DD` for daily keys).
    Week,
    /// 8 to 31 days: first, mid and last day of each month, short label.
    Month,
    /// 32 to 93 days: first period of each month, `Jan`.
    Quarter,
    /// 94 to 365 days: first period of each month, `Jan`.
    Year,
    /// 366 to 730 days: first period of each odd month, `YY.MM`.
    TwoYears,
    /// Longer: first period of each year, `YYYY`.
    MultiYear,
}

impl SpanClass {
    #[must_use]
    pub fn from_days(days: i64) -> Self {
        match days.abs() {
            ..=7 => Self::Week,
            8..=31 => Self::Month,
            32..=93 => Self::Quarter,
            94..=365 => Self::Year,
            366..=730 => Self::TwoYears,
            _ => Self::MultiYear,
        }
    }
}

impl Display for SpanClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// One labeled position on the time axis.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Tick {
    /// Index into the aligned period list.
    pub index: usize,
    pub label: String,
}

/// Axis labels, strictly ascending by index with no duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickSet {
    ticks: Vec<Tick>,
}

impl TickSet {
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[Tick] {
        &self.ticks
    }

    pub fn iter(&self) -> impl Iterator<Item = &Tick> {
        self.ticks.iter()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.ticks.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ticks.is_empty()
    }
}

impl From<BTreeMap<usize, String>> for TickSet {
    fn from(picks: BTreeMap<usize, String>) -> Self {
        Self {
            ticks: picks
                .into_iter()
                .map(|(index, label)| Tick { index, label })
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TickSet {
    type Item = &'a Tick;
    type IntoIter = std::slice::Iter<'a, Tick>;

    fn into_iter(self) -> Self::IntoIter {
        self.ticks.iter()
    }
}

/// Picks a readable subset of aligned periods to label.
///
/// Density follows the requested span, not the number of data points: a
/// year of daily rates gets twelve month labels, the same as a year of
/// monthly figures.
///
/// # Example
///
/// ```
/// use quantedge_chart::{Cadence, Period, RequestedSpan, TickSelector};
///
/// let periods: Vec<Period> = ["20240102", "20240103", "20240104"]
///     .into_iter()
///     .map(Period::from)
///     .collect();
/// let span = RequestedSpan::new("20240102", "20240104");
///
/// let ticks = TickSelector::new(Cadence::Daily).select(&periods, &span);
/// let labels: Vec<_> = ticks.iter().map(|t| t.label.as_str()).collect();
/// assert_eq!(labels, ["01.02", "01.03", "01.04"]);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TickSelector {
    cadence: Cadence,
}

impl TickSelector {
    #[must_use]
    pub fn new(cadence: Cadence) -> Self {
        Self { cadence }
    }

    /// Classifies the span by its length in days.
    ///
    /// Uses the requested start and effective end; if those do not parse,
    /// the first and last aligned periods. `None` when neither works.
    #[must_use]
    pub fn classify(&self, periods: &[Period], span: &RequestedSpan) -> Option<SpanClass> {
        let parse = |p: &Period| self.cadence.parse_period(p.as_str());

        let bounds = parse(&span.start)
            .zip(parse(span.effective_end()))
            .or_else(|| parse(periods.first()?).zip(parse(periods.last()?)));

        bounds.map(|(start, end)| SpanClass::from_days(days_between(start, end)))
    }

    /// Selects the ticks for `periods` (an aligned, sorted axis).
    #[must_use]
    pub fn select(&self, periods: &[Period], span: &RequestedSpan) -> TickSet {
        if periods.is_empty() {
            return TickSet::default();
        }

        let Some(class) = self.classify(periods, span) else {
            log::warn!(
                "cannot size ticks for span {}..{}, labeling endpoints only",
                span.start,
                span.effective_end(),
            );
            return self.endpoints(periods);
        };

        let dated: Vec<(usize, CalendarInstant)> = periods
            .iter()
            .enumerate()
            .filter_map(|(at, p)| Some((at, self.cadence.parse_period(p.as_str())?)))
            .collect();

        let mut picks = BTreeMap::new();
        let mut pick = |at: usize, label: String| {
            picks.entry(at).or_insert(label);
        };

        match class {
            SpanClass::Week => {
                for (at, period) in periods.iter().enumerate() {
                    pick(at, self.cadence.format_label(period.as_str()));
                }
            }
            SpanClass::Month => {
                for month in dated.chunk_by(same_month) {
                    for (at, _) in month_marks(month) {
                        pick(at, self.cadence.format_label(periods[at].as_str()));
                    }
                }
            }
            SpanClass::Quarter | SpanClass::Year => {
                for &(at, date) in dated.chunk_by(same_month).filter_map(<[_]>::first) {
                    pick(at, date.format("%b").to_string());
                }
            }
            SpanClass::TwoYears => {
                let odd = dated
                    .chunk_by(same_month)
                    .filter_map(<[_]>::first)
                    .filter(|(_, date)| date.month() % 2 == 1);
                for &(at, date) in odd {
                    pick(at, date.format("%y.%m").to_string());
                }
            }
            SpanClass::MultiYear => {
                for &(at, date) in dated
                    .chunk_by(|a, b| a.1.year() == b.1.year())
                    .filter_map(<[_]>::first)
                {
                    pick(at, date.format("%Y").to_string());
                }
            }
        }

        log::trace!("{class} span: {} ticks over {} periods", picks.len(), periods.len());

        TickSet::from(picks)
    }

    fn endpoints(&self, periods: &[Period]) -> TickSet {
        let mut picks = BTreeMap::new();
        for at in [0, periods.len() - 1] {
            picks
                .entry(at)
                .or_insert_with(|| self.cadence.format_label(periods[at].as_str()));
        }
        TickSet::from(picks)
    }
}

fn same_month(a: &(usize, CalendarInstant), b: &(usize, CalendarInstant)) -> bool {
    a.1.year() == b.1.year() && a.1.month() == b.1.month()
}

/// First day, the day nearest the 15th (within 13-17, lower on ties) and
/// last day of one month's periods.
fn month_marks(month: &[(usize, CalendarInstant)]) -> impl Iterator<Item = (usize, CalendarInstant)> {
    let mid = month
        .iter()
        .filter(|(_, date)| (13..=17).contains(&date.day()))
        .min_by_key(|(_, date)| date.day().abs_diff(15));

    month
        .first()
        .into_iter()
        .chain(mid)
        .chain(month.last())
        .copied()
}
