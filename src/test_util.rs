// src/test_util.rs

use chrono::{Datelike, Months, NaiveDate};

/// Asserts that two `f64` values are approximately equal using a
/// relative epsilon of `4 * f64::EPSILON`.
macro_rules! assert_approx {
    ($actual:expr, $expected:expr) => {{
        let (a, e) = ($actual, $expected);
        assert!(
            (a - e).abs() < e.abs() * 4.0 * f64::EPSILON,
            "assert_approx failed: actual={a}, expected={e}, diff={}",
            (a - e).abs(),
        );
    }};
}

pub(crate) use assert_approx;

/// Consecutive monthly observations starting at `year`/`month`.
pub fn monthly(year: i32, month: u32, values: &[f64]) -> Vec<(String, f64)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1).unwrap();
    values
        .iter()
        .zip(0u32..)
        .map(|(&value, offset)| {
            let date = start + Months::new(offset);
            (format!("{:04}{:02}", date.year(), date.month()), value)
        })
        .collect()
}

/// Consecutive daily observations starting at `start` (`YYYYMMDD`).
pub fn daily(start: &str, values: &[f64]) -> Vec<(String, f64)> {
    let start = NaiveDate::parse_from_str(start, "%Y%m%d").unwrap();
    start
        .iter_days()
        .zip(values)
        .map(|(date, &value)| (date.format("%Y%m%d").to_string(), value))
        .collect()
}

