#![allow(dead_code)]

use quantedge_chart::{Observation, SeriesSet, Value, parse_value};
use serde::{Deserialize, de::DeserializeOwned};

/// One row of a statistics export, value kept as published text
/// (`"1,315.0"`, `"-"`, `"n/a"`).
#[derive(Debug, Clone, Deserialize)]
pub struct RefRow {
    pub series: String,
    pub period: String,
    pub value: String,
}

impl Observation for RefRow {
    fn period(&self) -> &str {
        &self.period
    }

    fn value(&self) -> Option<Value> {
        parse_value(&self.value)
    }
}

/// USD/KRW closes for business days 2023-01-02..2024-05-31, JPY/KRW for
/// 2024 only. 2023-05-01 is published as `-`.
pub const EXCHANGE_DAILY: &str = "tests/fixtures/data/exchange-daily.csv";

/// KR, US and JP policy rates for 2024-01..2024-06; JP has no March row.
pub const POLICY_RATES_MONTHLY: &str = "tests/fixtures/data/policy-rates-monthly.csv";

/// KR quarterly growth 2022..2024Q2, 2022 keyed `YYYYn`, the rest `YYYYQn`,
/// and an unpublished 2024Q3.
pub const GDP_QUARTERLY: &str = "tests/fixtures/data/gdp-quarterly.csv";

/// Load raw rows.
pub fn load_rows(path: &str) -> Vec<RefRow> {
    load_records(path, "invalid statistics record")
}

/// Load rows into a [`SeriesSet`], one series per `series` column value, in
/// order of first appearance.
pub fn load_set(path: &str) -> SeriesSet {
    let rows = load_rows(path);
    let mut set = SeriesSet::new();
    for id in series_ids(&rows) {
        set.insert(id, rows.iter().filter(|r| r.series == id).cloned());
    }
    set
}

/// Like [`load_set`], keeping only rows with `start <= period <= end`.
///
/// Bounds compare as text, which orders fixed-width keys of one cadence.
pub fn load_set_between(path: &str, start: &str, end: &str) -> SeriesSet {
    let rows = load_rows(path);
    let mut set = SeriesSet::new();
    for id in series_ids(&rows) {
        set.insert(
            id,
            rows.iter()
                .filter(|r| r.series == id && (start..=end).contains(&r.period.as_str()))
                .cloned(),
        );
    }
    set
}

/// Published value of `series` at `period`.
pub fn value_at(path: &str, series: &str, period: &str) -> Option<Value> {
    load_rows(path)
        .iter()
        .find(|r| r.series == series && r.period == period)
        .and_then(Observation::value)
}

/// Assert two f64 values are within tolerance.
pub fn assert_near(actual: f64, expected: f64, tolerance: f64, context: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{context}: expected {expected:.10}, got {actual:.10}, diff {diff:.2e} > tolerance {tolerance:.2e}"
    );
}

fn series_ids(rows: &[RefRow]) -> Vec<&str> {
    let mut ids: Vec<&str> = Vec::new();
    for row in rows {
        if !ids.contains(&row.series.as_str()) {
            ids.push(&row.series);
        }
    }
    ids
}

fn load_records<D>(path: &str, expect_msg: &str) -> Vec<D>
where
    D: DeserializeOwned,
{
    let mut rdr =
        csv::Reader::from_path(path).unwrap_or_else(|e| panic!("failed to open {path}: {e}"));

    rdr.deserialize().map(|r| r.expect(expect_msg)).collect()
}
