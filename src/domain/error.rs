//! Domain error types.

use chrono::NaiveDateTime;

/// A timeframe label that does not name a known candle interval.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown timeframe '{input}' (expected one of M1, M5, M15, M30, H1, H4, D1, W1, MN)")]
pub struct ParseTimeframeError {
    pub input: String,
}

/// Top-level error type for candlecast.
#[derive(Debug, thiserror::Error)]
pub enum CandlecastError {
    #[error("CSV parse error at line {line}: {reason}")]
    CsvParse { line: u64, reason: String },

    #[error("invalid candle at {timestamp}: {reason}")]
    InvalidCandle {
        timestamp: NaiveDateTime,
        reason: String,
    },

    #[error("candles out of order: {current} does not follow {previous}")]
    NonMonotonic {
        previous: NaiveDateTime,
        current: NaiveDateTime,
    },

    #[error("no candles in {source_name}")]
    EmptyData { source_name: String },

    #[error("forecast {hours}h after {last} is outside the supported calendar")]
    HorizonOverflow { last: NaiveDateTime, hours: i64 },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error(transparent)]
    Timeframe(#[from] ParseTimeframeError),

    #[error("report error: {reason}")]
    Report { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&CandlecastError> for std::process::ExitCode {
    fn from(err: &CandlecastError) -> Self {
        let code: u8 = match err {
            CandlecastError::Io(_) => 1,
            CandlecastError::ConfigParse { .. } | CandlecastError::ConfigInvalid { .. } => 2,
            CandlecastError::CsvParse { .. }
            | CandlecastError::InvalidCandle { .. }
            | CandlecastError::NonMonotonic { .. }
            | CandlecastError::EmptyData { .. }
            | CandlecastError::HorizonOverflow { .. } => 3,
            CandlecastError::Timeframe(_) => 4,
            CandlecastError::Report { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn csv_parse_message_carries_line() {
        let err = CandlecastError::CsvParse {
            line: 7,
            reason: "invalid close value".into(),
        };
        assert_eq!(
            err.to_string(),
            "CSV parse error at line 7: invalid close value"
        );
    }

    #[test]
    fn non_monotonic_message() {
        let ts = NaiveDate::from_ymd_opt(2025, 5, 19)
            .unwrap()
            .and_hms_opt(15, 15, 0)
            .unwrap();
        let err = CandlecastError::NonMonotonic {
            previous: ts,
            current: ts,
        };
        assert!(err.to_string().contains("2025-05-19 15:15:00"));
    }

    #[test]
    fn timeframe_error_is_transparent() {
        let err: CandlecastError = ParseTimeframeError {
            input: "H7".into(),
        }
        .into();
        assert!(err.to_string().starts_with("unknown timeframe 'H7'"));
    }

    fn exit_code_repr(err: &CandlecastError) -> String {
        format!("{:?}", std::process::ExitCode::from(err))
    }

    fn expected_repr(code: u8) -> String {
        format!("{:?}", std::process::ExitCode::from(code))
    }

    #[test]
    fn exit_codes_by_category() {
        let io = CandlecastError::Io(std::io::Error::other("boom"));
        assert_eq!(exit_code_repr(&io), expected_repr(1));

        let cfg = CandlecastError::ConfigInvalid {
            section: "prediction".into(),
            key: "horizons".into(),
            reason: "must be positive".into(),
        };
        assert_eq!(exit_code_repr(&cfg), expected_repr(2));

        let data = CandlecastError::EmptyData {
            source_name: "x.csv".into(),
        };
        assert_eq!(exit_code_repr(&data), expected_repr(3));

        let overflow = CandlecastError::HorizonOverflow {
            last: NaiveDate::from_ymd_opt(2025, 5, 19)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            hours: i64::MAX,
        };
        assert_eq!(exit_code_repr(&overflow), expected_repr(3));

        let report = CandlecastError::Report {
            reason: "closed".into(),
        };
        assert_eq!(exit_code_repr(&report), expected_repr(5));
    }
}
