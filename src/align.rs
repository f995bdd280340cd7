use rustc_hash::{FxHashMap, FxHashSet};

use crate::{
    Cadence, CalendarInstant, Error, Period, Result, SeriesId, SeriesSet, Value,
    locate::{nearest_dated_index, nearest_index},
};

/// A value on the aligned axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sample {
    pub value: Value,
    /// `false` when the value was carried forward by gap-filling.
    pub actual: bool,
}

impl Sample {
    #[inline]
    #[must_use]
    pub fn actual(value: Value) -> Self {
        Self {
            value,
            actual: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn filled(value: Value) -> Self {
        Self {
            value,
            actual: false,
        }
    }
}

/// Gap-fill window: every cadence step from `start` to `end` inclusive.
///
/// Meant for daily series with non-trading days (weekends, holidays) but
/// works for any cadence. Inside the window, each series carries its most
/// recent actual value forward into periods it has no observation for.
/// Nothing is extrapolated before a series' first observation.
///
/// # Example
///
/// ```
/// use quantedge_chart::{Cadence, GapFill};
///
/// let window = GapFill::new(Cadence::Daily, "20240101", "20240107").unwrap();
/// assert_eq!(window.periods(Cadence::Daily).len(), 7);
///
/// assert!(GapFill::new(Cadence::Daily, "20240107", "20240101").is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct GapFill {
    start: CalendarInstant,
    end: CalendarInstant,
}

impl GapFill {
    /// Creates a window from two period keys of `cadence`.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPeriod`] when either key does not parse,
    /// [`Error::InvertedWindow`] when `start` is after `end`.
    pub fn new(cadence: Cadence, start: &str, end: &str) -> Result<Self> {
        let parse = |raw: &str| {
            cadence.parse_period(raw).ok_or_else(|| Error::InvalidPeriod {
                raw: raw.to_owned(),
                cadence,
            })
        };

        let (from, to) = (parse(start)?, parse(end)?);
        if from > to {
            return Err(Error::InvertedWindow {
                start: start.to_owned(),
                end: end.to_owned(),
            });
        }

        Ok(Self {
            start: from,
            end: to,
        })
    }

    #[inline]
    #[must_use]
    pub fn start(&self) -> CalendarInstant {
        self.start
    }

    #[inline]
    #[must_use]
    pub fn end(&self) -> CalendarInstant {
        self.end
    }

    /// Canonical keys of every period in the window, in order.
    #[must_use]
    pub fn periods(&self, cadence: Cadence) -> Vec<Period> {
        let mut keys = Vec::new();
        let mut at = Some(self.start);
        while let Some(date) = at.filter(|d| *d <= self.end) {
            keys.push(cadence.key(date));
            at = cadence.step(date);
        }
        keys
    }
}

/// One series projected onto the aligned axis.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedSeries {
    id: SeriesId,
    samples: Vec<Option<Sample>>,
}

impl AlignedSeries {
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Samples indexed like [`AlignedFrame::periods`]; `None` where the
    /// series has no value.
    #[inline]
    #[must_use]
    pub fn samples(&self) -> &[Option<Sample>] {
        &self.samples
    }

    #[inline]
    #[must_use]
    pub fn sample(&self, index: usize) -> Option<Sample> {
        self.samples.get(index).copied().flatten()
    }

    /// Values present in the column, actual and filled.
    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        self.samples.iter().flatten().map(|s| s.value)
    }
}

/// Shared chronological axis of all series in a refresh, with per-series
/// lookup.
///
/// Built by [`align`]. An empty frame is the valid "nothing to render"
/// state.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignedFrame {
    cadence: Cadence,
    periods: Vec<Period>,
    index: FxHashMap<Period, usize>,
    series: Vec<AlignedSeries>,
    chronological: bool,
}

impl AlignedFrame {
    #[must_use]
    pub fn empty(cadence: Cadence) -> Self {
        Self {
            cadence,
            periods: Vec::new(),
            index: FxHashMap::default(),
            series: Vec::new(),
            chronological: true,
        }
    }

    #[inline]
    #[must_use]
    pub fn cadence(&self) -> Cadence {
        self.cadence
    }

    /// The axis, sorted chronologically unless
    /// [`is_chronological`](Self::is_chronological) says otherwise.
    #[inline]
    #[must_use]
    pub fn periods(&self) -> &[Period] {
        &self.periods
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.periods.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.periods.is_empty()
    }

    /// `false` when some key was not a valid period and the axis fell back
    /// to lexical order.
    #[inline]
    #[must_use]
    pub fn is_chronological(&self) -> bool {
        self.chronological
    }

    /// Position of the period nearest to `target`.
    ///
    /// An exact hit wins. Otherwise a chronological axis is binary searched;
    /// a lexically sorted one is scanned, skipping keys that are not valid
    /// periods.
    #[must_use]
    pub fn nearest(&self, target: &str) -> Option<usize> {
        if let Some(at) = self.index_of(target) {
            return Some(at);
        }
        if self.chronological {
            nearest_index(&self.periods, target)
        } else {
            nearest_dated_index(&self.periods, self.cadence, target)
        }
    }

    #[must_use]
    pub fn period(&self, index: usize) -> Option<&Period> {
        self.periods.get(index)
    }

    /// Position of `period` on the axis. Accepts any key shape the cadence
    /// parses (`20241` finds `2024Q1`).
    #[must_use]
    pub fn index_of(&self, period: &str) -> Option<usize> {
        self.index
            .get(period)
            .or_else(|| self.index.get(canonical(self.cadence, period).as_str()))
            .copied()
    }

    pub fn series(&self) -> impl Iterator<Item = &AlignedSeries> {
        self.series.iter()
    }

    #[must_use]
    pub fn column(&self, id: &str) -> Option<&AlignedSeries> {
        self.series.iter().find(|s| s.id == id)
    }

    /// Value of series `id` at `period`, `None` when absent.
    #[must_use]
    pub fn lookup(&self, id: &str, period: &str) -> Option<Sample> {
        self.column(id)?.sample(self.index_of(period)?)
    }

    /// Every value on the frame, across all series.
    pub fn values(&self) -> impl Iterator<Item = Value> + '_ {
        self.series.iter().flat_map(AlignedSeries::values)
    }
}

/// Aligns a [`SeriesSet`] onto the union of its periods.
///
/// Periods are canonicalized and sorted by calendar. If any key fails to
/// parse, the whole axis is sorted lexically instead (logged at `warn`);
/// for fixed-width keys of one cadence this matches calendar order.
///
/// With a [`GapFill`] window, every period of the window joins the axis and
/// each series forward-fills into those it lacks, flagged non-actual. Window
/// periods left empty in every series are not kept.
///
/// # Example
///
/// ```
/// use quantedge_chart::{align, Cadence, SeriesSet};
///
/// let set = SeriesSet::new()
///     .with("KR", [("202401", 3.5), ("202403", 3.5)])
///     .with("US", [("202402", 5.5)]);
///
/// let frame = align(&set, Cadence::Monthly, None);
/// assert_eq!(frame.len(), 3);
/// assert_eq!(frame.lookup("KR", "202402"), None);
/// ```
#[must_use]
pub fn align(set: &SeriesSet, cadence: Cadence, gap_fill: Option<&GapFill>) -> AlignedFrame {
    let walked: Vec<Period> = gap_fill.map(|w| w.periods(cadence)).unwrap_or_default();

    let mut keys: FxHashSet<Period> = walked.iter().cloned().collect();
    for series in set {
        keys.extend(series.points().iter().map(|p| canonical(cadence, p.period.as_str())));
    }

    let (mut periods, chronological) = sort_axis(keys, cadence);
    let mut index = index_periods(&periods);
    let walked: FxHashSet<&str> = walked.iter().map(Period::as_str).collect();

    let mut filled = 0usize;
    let mut columns: Vec<AlignedSeries> = set
        .iter()
        .map(|series| {
            let mut samples = vec![None; periods.len()];
            for point in series.points() {
                if let Some(&at) = index.get(canonical(cadence, point.period.as_str()).as_str()) {
                    samples[at] = Some(Sample::actual(point.value));
                }
            }

            if gap_fill.is_some() {
                filled += forward_fill(&mut samples, &periods, &walked);
            }

            AlignedSeries {
                id: series.id().to_owned(),
                samples,
            }
        })
        .collect();

    if gap_fill.is_some() {
        let keep: Vec<bool> = (0..periods.len())
            .map(|at| columns.iter().any(|c| c.samples[at].is_some()))
            .collect();

        if keep.contains(&false) {
            periods = retain_by(periods, &keep);
            for column in &mut columns {
                column.samples = retain_by(std::mem::take(&mut column.samples), &keep);
            }
            index = index_periods(&periods);
        }
    }

    log::debug!(
        "aligned {} series onto {} {cadence} periods ({filled} filled)",
        columns.len(),
        periods.len(),
    );

    AlignedFrame {
        cadence,
        periods,
        index,
        series: columns,
        chronological,
    }
}

fn canonical(cadence: Cadence, raw: &str) -> Period {
    cadence
        .parse_period(raw)
        .map_or_else(|| Period::from(raw), |date| cadence.key(date))
}

fn sort_axis(keys: FxHashSet<Period>, cadence: Cadence) -> (Vec<Period>, bool) {
    let mut dated: Vec<(Option<CalendarInstant>, Period)> = keys
        .into_iter()
        .map(|key| (cadence.parse_period(key.as_str()), key))
        .collect();

    let chronological = dated.iter().all(|(date, _)| date.is_some());
    if chronological {
        dated.sort_unstable_by(|(a, _), (b, _)| a.cmp(b));
    } else {
        let bad = dated.iter().filter(|(date, _)| date.is_none()).count();
        log::warn!("{bad} period keys are not valid {cadence} periods, sorting axis lexically");
        dated.sort_unstable_by(|(_, a), (_, b)| a.as_str().cmp(b.as_str()));
    }

    (dated.into_iter().map(|(_, key)| key).collect(), chronological)
}

fn index_periods(periods: &[Period]) -> FxHashMap<Period, usize> {
    periods
        .iter()
        .enumerate()
        .map(|(at, period)| (period.clone(), at))
        .collect()
}

/// Carries the last actual value into walked periods the series lacks.
/// Returns the number of filled samples.
fn forward_fill(
    samples: &mut [Option<Sample>],
    periods: &[Period],
    walked: &FxHashSet<&str>,
) -> usize {
    let mut last: Option<Value> = None;
    let mut filled = 0;

    for (slot, period) in samples.iter_mut().zip(periods) {
        match *slot {
            Some(sample) => last = Some(sample.value),
            None => {
                if let Some(value) = last
                    && walked.contains(period.as_str())
                {
                    *slot = Some(Sample::filled(value));
                    filled += 1;
                }
            }
        }
    }

    filled
}

fn retain_by<T>(items: Vec<T>, keep: &[bool]) -> Vec<T> {
    items
        .into_iter()
        .zip(keep)
        .filter_map(|(item, keep)| keep.then_some(item))
        .collect()
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;

    fn periods(frame: &AlignedFrame) -> Vec<&str> {
        frame.periods().iter().map(Period::as_str).collect()
    }

    mod union {
        use super::*;

        #[test]
        fn empty_set_gives_empty_frame() {
            let frame = align(&SeriesSet::new(), Cadence::Daily, None);
            assert!(frame.is_empty());
            assert_eq!(frame.series().count(), 0);
        }

        #[test]
        fn sorts_union_chronologically() {
            let set = SeriesSet::new()
                .with("A", [("2024Q3", 1.0), ("2023Q4", 2.0)])
                .with("B", [("2024Q1", 3.0), ("2024Q3", 4.0)]);
            let frame = align(&set, Cadence::Quarterly, None);
            assert_eq!(periods(&frame), ["2023Q4", "2024Q1", "2024Q3"]);
        }

        #[test]
        fn canonicalizes_quarter_keys() {
            let set = SeriesSet::new()
                .with("A", [("20241", 1.0)])
                .with("B", [("2024Q1", 2.0)]);
            let frame = align(&set, Cadence::Quarterly, None);
            assert_eq!(periods(&frame), ["2024Q1"]);
            assert_eq!(frame.lookup("A", "20241"), Some(Sample::actual(1.0)));
            assert_eq!(frame.lookup("B", "20241"), Some(Sample::actual(2.0)));
        }

        #[test]
        fn missing_values_stay_absent_without_gap_fill() {
            let set = SeriesSet::new()
                .with("A", [("20240102", 1.0), ("20240103", 2.0)])
                .with("B", [("20240103", 5.0)]);
            let frame = align(&set, Cadence::Daily, None);
            assert_eq!(frame.lookup("B", "20240102"), None);
            assert_eq!(frame.column("B").unwrap().samples(), [None, Some(Sample::actual(5.0))]);
        }

        #[test]
        fn unparsable_keys_sort_lexically() {
            let set = SeriesSet::new().with("A", [("2024-02", 1.0), ("202401", 2.0), ("2023-12", 3.0)]);
            let frame = align(&set, Cadence::Monthly, None);
            assert_eq!(periods(&frame), ["2023-12", "2024-02", "202401"]);
        }
    }

    mod gap_fill {
        use super::*;

        fn weekday_set() -> SeriesSet {
            // Fri 5th and Mon 8th, weekend missing.
            SeriesSet::new()
                .with("USD", [("20240105", 1_310.0), ("20240108", 1_315.0)])
                .with("JPY", [("20240108", 9.1)])
        }

        #[test]
        fn weekend_carries_friday_forward() {
            let window = GapFill::new(Cadence::Daily, "20240105", "20240108").unwrap();
            let frame = align(&weekday_set(), Cadence::Daily, Some(&window));

            assert_eq!(periods(&frame), ["20240105", "20240106", "20240107", "20240108"]);
            assert_eq!(frame.lookup("USD", "20240106"), Some(Sample::filled(1_310.0)));
            assert_eq!(frame.lookup("USD", "20240107"), Some(Sample::filled(1_310.0)));
            assert_eq!(frame.lookup("USD", "20240108"), Some(Sample::actual(1_315.0)));
        }

        #[test]
        fn no_leading_extrapolation() {
            let window = GapFill::new(Cadence::Daily, "20240105", "20240108").unwrap();
            let frame = align(&weekday_set(), Cadence::Daily, Some(&window));
            assert_eq!(frame.lookup("JPY", "20240105"), None);
            assert_eq!(frame.lookup("JPY", "20240107"), None);
        }

        #[test]
        fn window_periods_before_any_data_are_dropped() {
            let window = GapFill::new(Cadence::Daily, "20240101", "20240108").unwrap();
            let frame = align(&weekday_set(), Cadence::Daily, Some(&window));
            assert_eq!(frame.periods()[0], "20240105");
            assert_eq!(frame.len(), 4);
        }

        #[test]
        fn uses_observations_before_window() {
            let set = SeriesSet::new().with("KR", [("202312", 3.5), ("202403", 3.25)]);
            let window = GapFill::new(Cadence::Monthly, "202401", "202403").unwrap();
            let frame = align(&set, Cadence::Monthly, Some(&window));
            assert_eq!(periods(&frame), ["202312", "202401", "202402", "202403"]);
            assert_eq!(frame.lookup("KR", "202402"), Some(Sample::filled(3.5)));
        }

        #[test]
        fn trailing_window_is_filled() {
            let set = SeriesSet::new().with("KR", [("2024Q1", 1.0)]);
            let window = GapFill::new(Cadence::Quarterly, "2024Q1", "2024Q3").unwrap();
            let frame = align(&set, Cadence::Quarterly, Some(&window));
            assert_eq!(frame.len(), 3);
            assert_eq!(frame.lookup("KR", "2024Q3"), Some(Sample::filled(1.0)));
        }

        #[test]
        fn is_idempotent() {
            let window = GapFill::new(Cadence::Daily, "20240101", "20240110").unwrap();
            let set = weekday_set();
            assert_eq!(
                align(&set, Cadence::Daily, Some(&window)),
                align(&set, Cadence::Daily, Some(&window)),
            );
        }
    }

    mod window {
        use super::*;

        #[test]
        fn rejects_unparsable_bounds() {
            assert_eq!(
                GapFill::new(Cadence::Monthly, "2024-01", "202402"),
                Err(Error::InvalidPeriod {
                    raw: "2024-01".into(),
                    cadence: Cadence::Monthly,
                }),
            );
        }

        #[test]
        fn rejects_inverted_bounds() {
            assert!(matches!(
                GapFill::new(Cadence::Annual, "2025", "2024"),
                Err(Error::InvertedWindow { .. })
            ));
        }

        #[test]
        fn single_period_window() {
            let window = GapFill::new(Cadence::Annual, "2024", "2024").unwrap();
            assert_eq!(window.periods(Cadence::Annual), [Period::from("2024")]);
        }
    }

    mod nearest {
        use super::*;

        fn frame_with_malformed_key() -> AlignedFrame {
            let set = SeriesSet::new().with(
                "USD",
                [
                    ("2024-01-15", 1.0),
                    ("20240110", 2.0),
                    ("20240112", 3.0),
                    ("20240120", 4.0),
                    ("20240125", 5.0),
                ],
            );
            align(&set, Cadence::Daily, None)
        }

        fn nearest(frame: &AlignedFrame, target: &str) -> Option<String> {
            frame.nearest(target).map(|at| frame.periods()[at].to_string())
        }

        #[test]
        fn lexical_axis_returns_exact_hits() {
            let frame = frame_with_malformed_key();
            assert!(!frame.is_chronological());
            assert_eq!(frame.periods()[0], "2024-01-15");

            for key in ["20240110", "20240112", "20240120", "20240125"] {
                assert_eq!(nearest(&frame, key).as_deref(), Some(key));
            }
        }

        #[test]
        fn lexical_axis_snaps_to_valid_periods() {
            let frame = frame_with_malformed_key();
            assert_eq!(nearest(&frame, "20240101").as_deref(), Some("20240110"));
            assert_eq!(nearest(&frame, "20240115").as_deref(), Some("20240112"));
            for day in 26..=31 {
                assert_eq!(nearest(&frame, &format!("202401{day}")).as_deref(), Some("20240125"));
            }
        }

        #[test]
        fn chronological_axis_uses_canonical_hits() {
            let set = SeriesSet::new().with("KR", [("2023Q4", 1.0), ("2024Q1", 2.0), ("2024Q3", 3.0)]);
            let frame = align(&set, Cadence::Quarterly, None);
            assert!(frame.is_chronological());
            assert_eq!(frame.nearest("20241"), Some(1));
            assert_eq!(frame.nearest("2024Q2"), Some(1));
            assert_eq!(frame.nearest("2030Q1"), Some(2));
        }
    }
}
