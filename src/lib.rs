//! Temporal multi-series chart engine for Rust.
//!
//! Turns per-series observations keyed by calendar period (daily
//! `YYYYMMDD`, monthly `YYYYMM`, quarterly `YYYYQn`, annual `YYYY`) into
//! everything a line chart needs: a shared period axis with optional
//! gap-filling, a padded display range, density-aware axis ticks, plot-space
//! paths and nearest-point hover lookup.
//!
//! Inputs accept any type implementing [`Observation`]. The pure building
//! blocks ([`align`], [`RangeConfig::compute`], [`TickSelector::select`],
//! [`Plot`], [`find_nearest`]) can be used on their own; [`ChartEngine`]
//! ties them together per chart, driven by a [`ChartProfile`].
//!
//! Nothing here draws: paths come out as points or SVG path data.

mod align;
mod cadence;
mod coords;
mod engine;
mod error;
mod locate;
mod observation;
mod period;
mod profile;
mod range;
mod series;
mod ticks;

pub use crate::align::{AlignedFrame, AlignedSeries, GapFill, Sample, align};
pub use crate::cadence::{Cadence, CalendarInstant, days_between};
pub use crate::coords::{CanvasSize, Padding, Plot, Point, SeriesPath};
pub use crate::engine::{
    ChartEngine, ChartSnapshot, HoverEntry, HoverReadout, PointerCoalescer, RefreshTicket,
};
pub use crate::error::{Error, Result};
pub use crate::locate::{find_nearest, nearest_dated_index, nearest_index};
pub use crate::observation::{DataPoint, Observation, SeriesId, Value, parse_value};
pub use crate::period::Period;
pub use crate::profile::{ChartProfile, ChartProfileBuilder};
pub use crate::range::{DisplayRange, NonNegative, RangeConfig, RangeConfigBuilder};
pub use crate::series::{Series, SeriesSet};
pub use crate::ticks::{RequestedSpan, SpanClass, Tick, TickSelector, TickSet};

#[cfg(test)]
mod test_util;
