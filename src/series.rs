use rustc_hash::FxHashMap;

use crate::{DataPoint, Observation, SeriesId, cadence::ingest_key};

/// One named series: data points with unique periods, in delivery order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    id: SeriesId,
    points: Vec<DataPoint>,
}

impl Series {
    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    #[must_use]
    pub fn points(&self) -> &[DataPoint] {
        &self.points
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Named series handed to the engine for one chart refresh.
///
/// Ingestion is the only place values are validated: observations with a
/// missing or non-finite value are dropped, and a repeated period keeps the
/// last value delivered for it. Quarter keys are stored as `YYYYQn`
/// whichever way they were written, so `20241` and `2024Q1` repeat one
/// period. A series left empty after filtering is treated as absent.
///
/// Series keep their insertion order, which is the order legends and hover
/// readouts list them in.
///
/// # Example
///
/// ```
/// use quantedge_chart::SeriesSet;
///
/// let mut set = SeriesSet::new();
/// set.insert("USD", [("20240102", "1,300.5"), ("20240103", "-")]);
/// set.insert("JPY", [("20240102", f64::NAN)]);
///
/// assert_eq!(set.len(), 1);
/// assert_eq!(set.get("USD").unwrap().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct SeriesSet {
    series: Vec<Series>,
}

impl SeriesSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingests one series, replacing any series already stored under `id`
    /// in place.
    ///
    /// Returns the number of points kept.
    pub fn insert<O: Observation>(
        &mut self,
        id: impl Into<SeriesId>,
        observations: impl IntoIterator<Item = O>,
    ) -> usize {
        let id = id.into();
        let mut points: Vec<DataPoint> = Vec::new();
        let mut seen: FxHashMap<String, usize> = FxHashMap::default();
        let mut dropped = 0usize;

        for obs in observations {
            let Some(value) = obs.value().filter(|v| v.is_finite()) else {
                log::trace!("{id}: dropping {} without a usable value", obs.period());
                dropped += 1;
                continue;
            };

            let period = ingest_key(obs.period());
            if let Some(&at) = seen.get(&*period) {
                points[at].value = value;
            } else {
                seen.insert(period.clone().into_owned(), points.len());
                points.push(DataPoint::new(period.into_owned(), value));
            }
        }

        if dropped > 0 {
            log::debug!("{id}: dropped {dropped} observations at ingestion");
        }

        let kept = points.len();
        let existing = self.series.iter().position(|s| s.id == id);
        match (existing, kept) {
            (Some(at), 0) => {
                self.series.remove(at);
            }
            (Some(at), _) => self.series[at].points = points,
            (None, 0) => {}
            (None, _) => self.series.push(Series { id, points }),
        }
        kept
    }

    /// Builder-style [`insert`](Self::insert).
    #[must_use]
    pub fn with<O: Observation>(
        mut self,
        id: impl Into<SeriesId>,
        observations: impl IntoIterator<Item = O>,
    ) -> Self {
        self.insert(id, observations);
        self
    }

    /// Removes a series, returning it when present.
    pub fn remove(&mut self, id: &str) -> Option<Series> {
        let at = self.series.iter().position(|s| s.id == id)?;
        Some(self.series.remove(at))
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Series> {
        self.series.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.series.iter().map(Series::id)
    }

    /// A copy restricted to the series `keep` accepts, in the same order.
    #[must_use]
    pub fn subset(&self, mut keep: impl FnMut(&str) -> bool) -> Self {
        Self {
            series: self
                .series
                .iter()
                .filter(|s| keep(&s.id))
                .cloned()
                .collect(),
        }
    }

    /// Number of non-empty series.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.series.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }
}

impl<'a> IntoIterator for &'a SeriesSet {
    type Item = &'a Series;
    type IntoIter = std::slice::Iter<'a, Series>;

    fn into_iter(self) -> Self::IntoIter {
        self.series.iter()
    }
}
