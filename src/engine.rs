//! Refresh and pointer plumbing around the pure chart components.
//!
//! [`ChartEngine`] owns one chart: its profile, its plot geometry, the data
//! of the last accepted refresh and the snapshot derived from it. Every
//! derived piece (frame, range, ticks, paths) is computed from the same
//! inputs and published together, so a renderer never sees a range that
//! belongs to a different frame.

use std::sync::Arc;

use crate::{
    AlignedFrame, ChartProfile, DisplayRange, GapFill, Period, Plot, RequestedSpan, SeriesId,
    SeriesPath, SeriesSet, TickSelector, TickSet, Value, align,
};

/// Proof of a refresh request, ordered by issue time.
///
/// Obtained from [`ChartEngine::begin_refresh`] before the data is fetched
/// and handed back to [`ChartEngine::refresh`] with the result. Only the
/// most recently issued tickets can still publish.
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
#[must_use]
pub struct RefreshTicket(u64);

impl RefreshTicket {
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// Everything a renderer needs for one frame of the chart.
///
/// Immutable once published; shared behind an [`Arc`].
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSnapshot {
    generation: u64,
    span: Option<RequestedSpan>,
    frame: AlignedFrame,
    range: Option<DisplayRange>,
    ticks: TickSet,
    paths: Vec<SeriesPath>,
}

impl ChartSnapshot {
    fn empty(profile: &ChartProfile) -> Self {
        Self {
            generation: 0,
            span: None,
            frame: AlignedFrame::empty(profile.cadence()),
            range: None,
            ticks: TickSet::default(),
            paths: Vec::new(),
        }
    }

    /// Generation of the refresh this snapshot was built from; `0` before
    /// the first one.
    #[inline]
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    #[must_use]
    pub fn span(&self) -> Option<&RequestedSpan> {
        self.span.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn frame(&self) -> &AlignedFrame {
        &self.frame
    }

    /// `None` when no active series has a value.
    #[inline]
    #[must_use]
    pub fn range(&self) -> Option<DisplayRange> {
        self.range
    }

    #[inline]
    #[must_use]
    pub fn ticks(&self) -> &TickSet {
        &self.ticks
    }

    #[inline]
    #[must_use]
    pub fn paths(&self) -> &[SeriesPath] {
        &self.paths
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frame.is_empty()
    }
}

/// One series' value under the pointer.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverEntry {
    pub id: SeriesId,
    /// `None` when the series has no value at this period.
    pub value: Option<Value>,
    /// `false` for carried-forward values.
    pub actual: bool,
    pub y: Option<f64>,
}

/// The period under the pointer and every active series' value there.
#[derive(Clone, Debug, PartialEq)]
pub struct HoverReadout {
    pub index: usize,
    pub period: Period,
    /// Full-precision label, e.g. `2024.01.05` or `2024 Q1`.
    pub label: String,
    pub x: f64,
    pub entries: Vec<HoverEntry>,
}

/// A single chart: profile, geometry, retained data and its latest
/// snapshot.
///
/// # Example
///
/// ```
/// use quantedge_chart::{
///     CanvasSize, ChartEngine, ChartProfile, Padding, Plot, RequestedSpan, SeriesSet,
/// };
///
/// let plot = Plot::new(CanvasSize::new(400.0, 200.0), Padding::uniform(20.0)).unwrap();
/// let mut engine = ChartEngine::new(ChartProfile::employment(), plot);
///
/// let ticket = engine.begin_refresh();
/// let set = SeriesSet::new().with("total", [("202401", 28_300.0), ("202402", 28_150.0)]);
/// assert!(engine.refresh(ticket, set, RequestedSpan::new("202401", "202402")));
///
/// let snapshot = engine.snapshot();
/// assert_eq!(snapshot.frame().len(), 2);
/// assert_eq!(snapshot.paths().len(), 1);
///
/// let hover = engine.hover_at(390.0).unwrap();
/// assert_eq!(hover.label, "2024.02");
/// ```
#[derive(Debug)]
pub struct ChartEngine {
    profile: ChartProfile,
    plot: Plot,
    /// `None` shows every series of the retained set.
    active: Option<Vec<SeriesId>>,
    issued: u64,
    retained: Option<(SeriesSet, RequestedSpan)>,
    snapshot: Arc<ChartSnapshot>,
}

impl ChartEngine {
    #[must_use]
    pub fn new(profile: ChartProfile, plot: Plot) -> Self {
        let active = (!profile.series().is_empty()).then(|| profile.series().to_vec());
        let snapshot = Arc::new(ChartSnapshot::empty(&profile));
        Self {
            profile,
            plot,
            active,
            issued: 0,
            retained: None,
            snapshot,
        }
    }

    #[inline]
    #[must_use]
    pub fn profile(&self) -> &ChartProfile {
        &self.profile
    }

    #[inline]
    #[must_use]
    pub fn plot(&self) -> &Plot {
        &self.plot
    }

    /// The latest published snapshot.
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Arc<ChartSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Starts a refresh. Call before fetching, so that a slow response for
    /// an older request cannot overwrite a newer one.
    pub fn begin_refresh(&mut self) -> RefreshTicket {
        self.issued += 1;
        RefreshTicket(self.issued)
    }

    /// Replaces the chart's data and publishes a new snapshot.
    ///
    /// Returns `false`, leaving the chart untouched, when a ticket issued
    /// later has already published.
    pub fn refresh(&mut self, ticket: RefreshTicket, set: SeriesSet, span: RequestedSpan) -> bool {
        if ticket.0 <= self.snapshot.generation {
            log::warn!(
                "{}: dropping stale refresh {} (published {})",
                self.profile.name(),
                ticket.0,
                self.snapshot.generation,
            );
            return false;
        }

        let snapshot = self.render(ticket.0, &set, &span);
        self.retained = Some((set, span));
        self.snapshot = Arc::new(snapshot);
        true
    }

    /// Ids of the visible series; `None` while every series is shown.
    #[must_use]
    pub fn active(&self) -> Option<&[SeriesId]> {
        self.active.as_deref()
    }

    #[must_use]
    pub fn is_active(&self, id: &str) -> bool {
        self.active
            .as_ref()
            .is_none_or(|ids| ids.iter().any(|a| a == id))
    }

    /// Shows exactly `ids` and rebuilds the snapshot from retained data.
    pub fn set_active<I>(&mut self, ids: I)
    where
        I: IntoIterator,
        I::Item: Into<SeriesId>,
    {
        let mut active: Vec<SeriesId> = Vec::new();
        for id in ids {
            let id = id.into();
            if !active.contains(&id) {
                active.push(id);
            }
        }
        self.active = Some(active);
        self.rerender();
    }

    /// Flips the visibility of `id` and rebuilds the snapshot from retained
    /// data. Returns whether the series is now visible.
    pub fn toggle(&mut self, id: &str) -> bool {
        let retained_ids = || -> Vec<SeriesId> {
            self.retained
                .as_ref()
                .map(|(set, _)| set.ids().map(str::to_owned).collect())
                .unwrap_or_default()
        };
        let mut active: Vec<SeriesId> = self.active.take().unwrap_or_else(retained_ids);

        let visible = match active.iter().position(|a| a == id) {
            Some(at) => {
                active.remove(at);
                false
            }
            None => {
                active.push(id.to_owned());
                true
            }
        };

        self.active = Some(active);
        self.rerender();
        visible
    }

    /// Moves the chart to new canvas geometry, keeping its data.
    pub fn resize(&mut self, plot: Plot) {
        self.plot = plot;
        self.rerender();
    }

    /// Readout for the period nearest to canvas x-coordinate `x`.
    ///
    /// `None` while the chart is empty.
    #[must_use]
    pub fn hover_at(&self, x: f64) -> Option<HoverReadout> {
        let index = self.plot.index_at(x, self.snapshot.frame.len())?;
        self.readout(index)
    }

    /// Readout for the period nearest to `target`, e.g. a date picked
    /// elsewhere on the page.
    #[must_use]
    pub fn hover_period(&self, target: &str) -> Option<HoverReadout> {
        let index = self.snapshot.frame.nearest(target)?;
        self.readout(index)
    }

    fn readout(&self, index: usize) -> Option<HoverReadout> {
        let snapshot = &self.snapshot;
        let frame = &snapshot.frame;
        let period = frame.period(index)?.clone();

        let entries = frame
            .series()
            .map(|column| {
                let sample = column.sample(index);
                HoverEntry {
                    id: column.id().to_owned(),
                    value: sample.map(|s| s.value),
                    actual: sample.is_some_and(|s| s.actual),
                    y: sample
                        .zip(snapshot.range.as_ref())
                        .map(|(s, range)| self.plot.y(s.value, range)),
                }
            })
            .collect();

        Some(HoverReadout {
            index,
            label: frame.cadence().format_full(period.as_str()),
            x: self.plot.x(index, frame.len()),
            period,
            entries,
        })
    }

    fn rerender(&mut self) {
        let Some((set, span)) = &self.retained else {
            return;
        };
        let snapshot = self.render(self.snapshot.generation, set, span);
        self.snapshot = Arc::new(snapshot);
    }

    fn render(&self, generation: u64, set: &SeriesSet, span: &RequestedSpan) -> ChartSnapshot {
        let cadence = self.profile.cadence();
        let visible = set.subset(|id| self.is_active(id));

        let window = self
            .profile
            .gap_fill()
            .then(|| GapFill::new(cadence, span.start.as_str(), span.end.as_str()))
            .transpose()
            .unwrap_or_else(|err| {
                log::warn!("{}: gap-fill skipped: {err}", self.profile.name());
                None
            });

        let frame = align(&visible, cadence, window.as_ref());
        let range = DisplayRange::for_frame(&frame, self.profile.range());
        let ticks = TickSelector::new(cadence).select(frame.periods(), span);
        let paths = range
            .map(|range| SeriesPath::for_frame(&frame, &self.plot, &range))
            .unwrap_or_default();

        log::debug!(
            "{}: generation {generation}: {} periods, {} of {} series, {} ticks, range {}",
            self.profile.name(),
            frame.len(),
            visible.len(),
            set.len(),
            ticks.len(),
            range.map_or_else(|| "none".to_owned(), |r| r.to_string()),
        );

        ChartSnapshot {
            generation,
            span: Some(span.clone()),
            frame,
            range,
            ticks,
            paths,
        }
    }
}

/// Collapses pointer-move events to one hover lookup per animation frame.
///
/// Moves between frames overwrite each other; only the latest position is
/// looked up.
#[derive(Clone, Copy, Debug, Default)]
pub struct PointerCoalescer {
    pending: Option<f64>,
}

impl PointerCoalescer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn on_move(&mut self, x: f64) {
        self.pending = Some(x);
    }

    #[inline]
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Consumes the latest position, if any moved since the last frame.
    pub fn on_frame(&mut self, engine: &ChartEngine) -> Option<HoverReadout> {
        let x = self.pending.take()?;
        engine.hover_at(x)
    }
}
