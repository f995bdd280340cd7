use crate::{Cadence, Period};

/// Nearest period to `target` in a sorted axis.
///
/// Period keys of one cadence are fixed-width digit strings, so their
/// digits read as a number preserve order. The search is a binary search on
/// that number: on an exact hit the period itself is returned, otherwise
/// the closer of the two neighbours, and on equal distance the earlier one.
///
/// Runs in O(log n). Returns `None` for an empty axis or a target without
/// digits. The axis must be in calendar order; for a lexically sorted axis
/// holding malformed keys use [`nearest_dated_index`], or
/// [`AlignedFrame::nearest`](crate::AlignedFrame::nearest) which picks the
/// right search.
///
/// # Example
///
/// ```
/// use quantedge_chart::{find_nearest, Period};
///
/// let axis: Vec<Period> = ["20240101", "20240103", "20240105"]
///     .into_iter()
///     .map(Period::from)
///     .collect();
///
/// assert_eq!(find_nearest(&axis, "20240102").unwrap(), "20240101");
/// assert_eq!(find_nearest(&axis, "20240104").unwrap(), "20240103");
/// assert_eq!(find_nearest(&axis, "20240109").unwrap(), "20240105");
/// ```
#[must_use]
pub fn find_nearest<'a>(sorted: &'a [Period], target: &str) -> Option<&'a Period> {
    nearest_index(sorted, target).map(|at| &sorted[at])
}

/// Index form of [`find_nearest`].
#[must_use]
pub fn nearest_index(sorted: &[Period], target: &str) -> Option<usize> {
    let target = digit_value(target)?;
    let key = |p: &Period| digit_value(p.as_str()).unwrap_or(0);

    let at = sorted.partition_point(|p| key(p) < target);

    match (at.checked_sub(1), (at < sorted.len()).then_some(at)) {
        (Some(before), Some(after)) => {
            let below = target - key(&sorted[before]);
            let above = key(&sorted[after]) - target;
            Some(if below <= above { before } else { after })
        }
        (before, after) => before.or(after),
    }
}

/// Nearest valid `cadence` period to `target` on an axis in any order.
///
/// Keys that are not valid periods are never returned. Distance is the same
/// digit distance [`nearest_index`] uses, ties going to the earlier period.
/// Linear in the axis length.
#[must_use]
pub fn nearest_dated_index(axis: &[Period], cadence: Cadence, target: &str) -> Option<usize> {
    let target = digit_value(target)?;

    axis.iter()
        .enumerate()
        .filter(|(_, p)| cadence.parse_period(p.as_str()).is_some())
        .filter_map(|(at, p)| Some((at, digit_value(p.as_str())?)))
        .min_by_key(|&(_, value)| (value.abs_diff(target), value))
        .map(|(at, _)| at)
}

/// The digits of `raw` read as one decimal number: `2024Q3` is `20243`.
fn digit_value(raw: &str) -> Option<u64> {
    let mut digits = raw.bytes().filter(u8::is_ascii_digit).peekable();
    digits.peek()?;
    digits.try_fold(0u64, |acc, b| {
        acc.checked_mul(10)?.checked_add(u64::from(b - b'0'))
    })
}
