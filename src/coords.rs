//! Plot-space geometry.
//!
//! Maps aligned values onto a logical canvas: x follows the period index,
//! y follows the value within a [`DisplayRange`], inverted so that higher
//! values plot higher. Everything here is plain numbers; binding the
//! geometry to a drawing surface is the renderer's job.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::{AlignedFrame, AlignedSeries, DisplayRange, Error, Result, SeriesId, Value};

/// Logical size of the whole canvas.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f64,
    pub height: f64,
}

impl CanvasSize {
    #[must_use]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Space reserved around the plot area for axes and labels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Padding {
    #[must_use]
    pub const fn new(top: f64, right: f64, bottom: f64, left: f64) -> Self {
        Self {
            top,
            right,
            bottom,
            left,
        }
    }

    #[must_use]
    pub const fn uniform(space: f64) -> Self {
        Self::new(space, space, space, space)
    }
}

/// A position in canvas coordinates, origin top-left.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

/// Canvas plus padding: the inner rectangle series are drawn in.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Plot {
    canvas: CanvasSize,
    padding: Padding,
}

impl Plot {
    /// # Errors
    ///
    /// [`Error::EmptyPlotArea`] when the padding leaves no positive, finite
    /// inner width and height.
    pub fn new(canvas: CanvasSize, padding: Padding) -> Result<Self> {
        let plot = Self { canvas, padding };
        let (width, height) = (plot.inner_width(), plot.inner_height());

        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Ok(plot)
        } else {
            Err(Error::EmptyPlotArea { width, height })
        }
    }

    #[inline]
    #[must_use]
    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    #[inline]
    #[must_use]
    pub fn padding(&self) -> Padding {
        self.padding
    }

    #[inline]
    #[must_use]
    pub fn inner_width(&self) -> f64 {
        self.canvas.width - self.padding.left - self.padding.right
    }

    #[inline]
    #[must_use]
    pub fn inner_height(&self) -> f64 {
        self.canvas.height - self.padding.top - self.padding.bottom
    }

    /// X of period `index` on an axis of `total` periods. A lone period sits
    /// on the left edge.
    #[inline]
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn x(&self, index: usize, total: usize) -> f64 {
        let last = total.saturating_sub(1).max(1) as f64;
        self.padding.left + (index as f64 / last) * self.inner_width()
    }

    /// Y of `value` within `range`.
    #[inline]
    #[must_use]
    pub fn y(&self, value: Value, range: &DisplayRange) -> f64 {
        let t = (value - range.min) / range.span();
        self.padding.top + (1.0 - t) * self.inner_height()
    }

    #[inline]
    #[must_use]
    pub fn map(&self, value: Value, index: usize, total: usize, range: &DisplayRange) -> Point {
        Point {
            x: self.x(index, total),
            y: self.y(value, range),
        }
    }

    /// Index of the period nearest to canvas x-coordinate `x`.
    ///
    /// Positions outside the plot clamp to the first or last period.
    /// `None` for an empty axis.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn index_at(&self, x: f64, total: usize) -> Option<usize> {
        if total == 0 || x.is_nan() {
            return None;
        }

        let t = ((x - self.padding.left) / self.inner_width()).clamp(0.0, 1.0);
        let index = (t * (total - 1) as f64).round() as usize;
        Some(index.min(total - 1))
    }

    /// Value at canvas y-coordinate `y`, for crosshair labels.
    #[inline]
    #[must_use]
    pub fn value_at(&self, y: f64, range: &DisplayRange) -> Value {
        let t = 1.0 - (y - self.padding.top) / self.inner_height();
        range.min + t * range.span()
    }
}

/// Renderable line of one series.
///
/// Consecutive present samples are joined; a missing sample breaks the line
/// into a new segment rather than interpolating across it.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesPath {
    id: SeriesId,
    segments: Vec<Vec<Point>>,
}

impl SeriesPath {
    #[must_use]
    pub fn build(column: &AlignedSeries, plot: &Plot, range: &DisplayRange) -> Self {
        let total = column.samples().len();
        let mut segments: Vec<Vec<Point>> = Vec::new();
        let mut current: Vec<Point> = Vec::new();

        for (index, sample) in column.samples().iter().enumerate() {
            match sample {
                Some(sample) => current.push(plot.map(sample.value, index, total, range)),
                None if !current.is_empty() => segments.push(std::mem::take(&mut current)),
                None => {}
            }
        }
        if !current.is_empty() {
            segments.push(current);
        }

        Self {
            id: column.id().to_owned(),
            segments,
        }
    }

    /// Paths for every series on `frame`, in frame order.
    #[must_use]
    pub fn for_frame(frame: &AlignedFrame, plot: &Plot, range: &DisplayRange) -> Vec<Self> {
        frame
            .series()
            .map(|column| Self::build(column, plot, range))
            .collect()
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[Vec<Point>] {
        &self.segments
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> {
        self.segments.iter().flatten()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// SVG path data: one `M` per segment followed by `L` commands,
    /// coordinates to two decimals.
    #[must_use]
    pub fn to_svg_path(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            for (i, p) in segment.iter().enumerate() {
                let command = if i == 0 { 'M' } else { 'L' };
                if !out.is_empty() {
                    out.push(' ');
                }
                let _ = write!(out, "{command}{:.2} {:.2}", p.x, p.y);
            }
        }
        out
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::{Cadence, SeriesSet, align, test_util::assert_approx};

    fn plot() -> Plot {
        // inner area 100 x 50 starting at (10, 5)
        Plot::new(CanvasSize::new(120.0, 65.0), Padding::new(5.0, 10.0, 10.0, 10.0)).unwrap()
    }

    fn range() -> DisplayRange {
        DisplayRange {
            min: 0.0,
            max: 10.0,
        }
    }

    mod mapping {
        use super::*;

        #[test]
        fn corners() {
            let p = plot();
            assert_eq!(p.map(10.0, 0, 5, &range()), Point { x: 10.0, y: 5.0 });
            assert_eq!(p.map(0.0, 4, 5, &range()), Point { x: 110.0, y: 55.0 });
        }

        #[test]
        fn midpoint() {
            let p = plot().map(5.0, 2, 5, &range());
            assert_eq!(p, Point { x: 60.0, y: 30.0 });
        }

        #[test]
        fn single_period_sits_on_left_edge() {
            assert_eq!(plot().x(0, 1), 10.0);
        }

        #[test]
        fn degenerate_range_does_not_divide_by_zero() {
            let flat = DisplayRange { min: 3.0, max: 3.0 };
            let y = plot().y(3.0, &flat);
            assert!(y.is_finite());
            assert_eq!(y, 55.0);
        }
    }

    mod inverse {
        use super::*;

        #[test]
        fn index_at_rounds_to_nearest() {
            let p = plot();
            assert_eq!(p.index_at(10.0, 5), Some(0));
            assert_eq!(p.index_at(34.0, 5), Some(1));
            assert_eq!(p.index_at(36.0, 5), Some(1));
            assert_eq!(p.index_at(110.0, 5), Some(4));
        }

        #[test]
        fn index_at_clamps_outside_plot() {
            let p = plot();
            assert_eq!(p.index_at(-50.0, 5), Some(0));
            assert_eq!(p.index_at(500.0, 5), Some(4));
        }

        #[test]
        fn index_at_empty_axis() {
            assert_eq!(plot().index_at(50.0, 0), None);
            assert_eq!(plot().index_at(50.0, 1), Some(0));
        }

        #[test]
        fn value_at_inverts_y() {
            let p = plot();
            let y = p.y(7.5, &range());
            assert_approx!(p.value_at(y, &range()), 7.5);
        }
    }

    mod plot_area {
        use super::*;

        #[test]
        fn rejects_padding_wider_than_canvas() {
            let err = Plot::new(CanvasSize::new(40.0, 40.0), Padding::uniform(20.0)).unwrap_err();
            assert_eq!(
                err,
                Error::EmptyPlotArea {
                    width: 0.0,
                    height: 0.0
                }
            );
        }
    }

    mod paths {
        use super::*;

        /// Series "A" with `values`, next to a complete series "B" that
        /// keeps all five years on the axis.
        fn column(values: &[Option<f64>]) -> AlignedFrame {
            let keys = ["2020", "2021", "2022", "2023", "2024"];
            let set = SeriesSet::new()
                .with("A", keys.into_iter().zip(values.iter().copied()))
                .with("B", keys.map(|k| (k, 1.0)));
            align(&set, Cadence::Annual, None)
        }

        #[test]
        fn breaks_at_missing_samples() {
            let frame = column(&[Some(1.0), Some(2.0), None, Some(4.0), Some(5.0)]);
            let path = SeriesPath::build(frame.column("A").unwrap(), &plot(), &range());
            assert_eq!(path.segments().len(), 2);
            assert_eq!(path.segments()[0].len(), 2);
            assert_eq!(path.segments()[1].len(), 2);
            assert_eq!(path.points().count(), 4);
        }

        #[test]
        fn x_follows_axis_index() {
            let frame = column(&[None, Some(2.0), None, None, Some(5.0)]);
            let path = SeriesPath::build(frame.column("A").unwrap(), &plot(), &range());
            let xs: Vec<f64> = path.points().map(|p| p.x).collect();
            assert_eq!(xs, [35.0, 110.0]);
        }

        #[test]
        fn svg_path_commands() {
            let frame = column(&[Some(10.0), Some(0.0), None, Some(5.0), None]);
            let path = SeriesPath::build(frame.column("A").unwrap(), &plot(), &range());
            assert_eq!(
                path.to_svg_path(),
                "M10.00 5.00 L35.00 55.00 M85.00 30.00"
            );
        }

        #[test]
        fn one_path_per_series() {
            let frame = column(&[Some(1.0), None, None, None, None]);
            let paths = SeriesPath::for_frame(&frame, &plot(), &range());
            let ids: Vec<&str> = paths.iter().map(SeriesPath::id).collect();
            assert_eq!(ids, ["A", "B"]);
        }
    }
}
