use crate::Cadence;

/// Configuration errors raised at the engine's boundary.
///
/// Data problems never produce an `Error`: malformed periods degrade to
/// lexical ordering and unusable values are dropped at ingestion. Errors are
/// reserved for caller-supplied configuration that cannot describe a chart.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("'{raw}' is not a valid {cadence} period")]
    InvalidPeriod { raw: String, cadence: Cadence },

    #[error("window start {start} is after its end {end}")]
    InvertedWindow { start: String, end: String },

    #[error("expected a finite, non-negative number, got {value}")]
    InvalidNumber { value: f64 },

    #[error("plot area has no drawable space: {width}x{height} after padding")]
    EmptyPlotArea { width: f64, height: f64 },
}

/// Result alias for fallible configuration.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_period_message() {
        let err = Error::InvalidPeriod {
            raw: "2024-01".into(),
            cadence: Cadence::Monthly,
        };
        assert_eq!(err.to_string(), "'2024-01' is not a valid monthly period");
    }

    #[test]
    fn inverted_window_message() {
        let err = Error::InvertedWindow {
            start: "20240301".into(),
            end: "20240201".into(),
        };
        assert_eq!(
            err.to_string(),
            "window start 20240301 is after its end 20240201"
        );
    }
}
