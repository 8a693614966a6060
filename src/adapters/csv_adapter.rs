//! CSV file candle source.
//!
//! Expects a header row naming `Date`, `Time`, `Open`, `High`, `Low`, `Close`
//! and `Volume` (any case, any order). Extra columns such as `Openint` are
//! ignored. Without a `Time` column the `Date` field may carry a full
//! timestamp.

use crate::domain::error::CandlecastError;
use crate::domain::ohlcv::{Candle, CandleSeries};
use crate::domain::timeframe::InstrumentInfo;
use crate::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y.%m.%d", "%Y/%m/%d"];
const TIME_FORMATS: [&str; 2] = ["%H:%M:%S", "%H:%M"];
const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

pub struct CsvAdapter {
    path: PathBuf,
    instrument: InstrumentInfo,
}

struct Columns {
    date: usize,
    time: Option<usize>,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: usize,
}

impl CsvAdapter {
    /// Symbol and timeframe are inferred from the file name.
    pub fn new(path: PathBuf) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let instrument = InstrumentInfo::from_file_stem(&stem);
        Self { path, instrument }
    }

    pub fn with_instrument(mut self, instrument: InstrumentInfo) -> Self {
        self.instrument = instrument;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn locate_columns(headers: &csv::StringRecord) -> Result<Columns, CandlecastError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| CandlecastError::CsvParse {
                line: 1,
                reason: format!("missing {} column", name),
            })
        };

        Ok(Columns {
            date: require("date")?,
            time: find("time"),
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: require("volume")?,
        })
    }
}

fn parse_timestamp(date: &str, time: Option<&str>) -> Option<NaiveDateTime> {
    match time {
        Some(time) => {
            let date = DATE_FORMATS
                .iter()
                .find_map(|f| NaiveDate::parse_from_str(date, f).ok())?;
            let time = TIME_FORMATS
                .iter()
                .find_map(|f| NaiveTime::parse_from_str(time, f).ok())?;
            Some(date.and_time(time))
        }
        None => DATETIME_FORMATS
            .iter()
            .find_map(|f| NaiveDateTime::parse_from_str(date, f).ok())
            .or_else(|| {
                DATE_FORMATS
                    .iter()
                    .find_map(|f| NaiveDate::parse_from_str(date, f).ok())
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            }),
    }
}

fn parse_field(record: &csv::StringRecord, index: usize, name: &str, line: u64) -> Result<f64, CandlecastError> {
    record
        .get(index)
        .ok_or_else(|| CandlecastError::CsvParse {
            line,
            reason: format!("missing {} column", name),
        })?
        .parse()
        .map_err(|e| CandlecastError::CsvParse {
            line,
            reason: format!("invalid {} value: {}", name, e),
        })
}

impl DataPort for CsvAdapter {
    fn fetch_candles(
        &self,
        start: Option<NaiveDateTime>,
        end: Option<NaiveDateTime>,
    ) -> Result<CandleSeries, CandlecastError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_path(&self.path)
            .map_err(|e| match e.into_kind() {
                csv::ErrorKind::Io(io) => CandlecastError::Io(io),
                other => CandlecastError::CsvParse {
                    line: 1,
                    reason: format!("{:?}", other),
                },
            })?;

        let headers = rdr.headers().map_err(|e| CandlecastError::CsvParse {
            line: 1,
            reason: format!("unreadable header: {}", e),
        })?;
        let cols = Self::locate_columns(headers)?;

        let mut candles = Vec::new();
        for result in rdr.records() {
            let record = result.map_err(|e| CandlecastError::CsvParse {
                line: e.position().map_or(0, |p| p.line()),
                reason: e.to_string(),
            })?;
            let line = record.position().map_or(0, |p| p.line());

            if record.iter().all(|field| field.is_empty()) {
                continue;
            }

            let date_str = record.get(cols.date).ok_or_else(|| CandlecastError::CsvParse {
                line,
                reason: "missing date column".into(),
            })?;
            let time_str = match cols.time {
                Some(idx) => Some(record.get(idx).ok_or_else(|| CandlecastError::CsvParse {
                    line,
                    reason: "missing time column".into(),
                })?),
                None => None,
            };
            let timestamp =
                parse_timestamp(date_str, time_str).ok_or_else(|| CandlecastError::CsvParse {
                    line,
                    reason: format!(
                        "invalid timestamp: {}{}",
                        date_str,
                        time_str.map(|t| format!(" {}", t)).unwrap_or_default()
                    ),
                })?;

            let open = parse_field(&record, cols.open, "open", line)?;
            let high = parse_field(&record, cols.high, "high", line)?;
            let low = parse_field(&record, cols.low, "low", line)?;
            let close = parse_field(&record, cols.close, "close", line)?;
            let volume = parse_field(&record, cols.volume, "volume", line)?;
            let candle = Candle::new(timestamp, open, high, low, close, volume)?;

            // Rows outside the range are still fully validated.
            if start.is_some_and(|s| timestamp < s) || end.is_some_and(|e| timestamp > e) {
                continue;
            }
            candles.push(candle);
        }

        candles.sort_by_key(|c| c.timestamp);
        debug!(path = %self.path.display(), rows = candles.len(), "parsed candles");

        let series = CandleSeries::new(candles)?;
        if let Some((first, last)) = series.range() {
            info!(
                "Loaded {} candles for {} ({}), {} to {}",
                series.len(),
                self.instrument.symbol_label(),
                self.instrument.timeframe_label(),
                first,
                last
            );
        }
        Ok(series)
    }

    fn instrument(&self) -> InstrumentInfo {
        self.instrument.clone()
    }
}
