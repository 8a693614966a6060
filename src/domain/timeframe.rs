//! Candle interval labels and instrument metadata inferred from file names.

use std::fmt;
use std::str::FromStr;

use chrono::Duration;

use crate::domain::error::ParseTimeframeError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Timeframe {
    M1,
    M5,
    M15,
    M30,
    H1,
    H4,
    D1,
    W1,
    /// One calendar month.
    MN,
}

impl Timeframe {
    pub const ALL: [Timeframe; 9] = [
        Timeframe::M1,
        Timeframe::M5,
        Timeframe::M15,
        Timeframe::M30,
        Timeframe::H1,
        Timeframe::H4,
        Timeframe::D1,
        Timeframe::W1,
        Timeframe::MN,
    ];

    /// Nominal length of one candle. Months are approximated as 30 days.
    pub fn duration(&self) -> Duration {
        match self {
            Timeframe::M1 => Duration::minutes(1),
            Timeframe::M5 => Duration::minutes(5),
            Timeframe::M15 => Duration::minutes(15),
            Timeframe::M30 => Duration::minutes(30),
            Timeframe::H1 => Duration::hours(1),
            Timeframe::H4 => Duration::hours(4),
            Timeframe::D1 => Duration::days(1),
            Timeframe::W1 => Duration::weeks(1),
            Timeframe::MN => Duration::days(30),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Timeframe::M1 => "M1",
            Timeframe::M5 => "M5",
            Timeframe::M15 => "M15",
            Timeframe::M30 => "M30",
            Timeframe::H1 => "H1",
            Timeframe::H4 => "H4",
            Timeframe::D1 => "D1",
            Timeframe::W1 => "W1",
            Timeframe::MN => "MN",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Timeframe {
    type Err = ParseTimeframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.label() == upper)
            .ok_or_else(|| ParseTimeframeError {
                input: s.to_string(),
            })
    }
}

/// Symbol and timeframe of the loaded instrument, when known.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstrumentInfo {
    pub symbol: Option<String>,
    pub timeframe: Option<Timeframe>,
}

impl InstrumentInfo {
    /// Infer metadata from a file stem such as `EURUSD_H1` or `BTC/USDT-m15`.
    ///
    /// The symbol is the first run of uppercase ASCII letters, optionally
    /// joined to a second run by `/`. The timeframe is the first segment
    /// between non-alphanumeric separators that parses as a [`Timeframe`].
    pub fn from_file_stem(stem: &str) -> Self {
        let timeframe = stem
            .split(|c: char| !c.is_ascii_alphanumeric())
            .find_map(|segment| segment.parse::<Timeframe>().ok());

        Self {
            symbol: infer_symbol(stem),
            timeframe,
        }
    }

    pub fn symbol_label(&self) -> &str {
        self.symbol.as_deref().unwrap_or("Unknown")
    }

    pub fn timeframe_label(&self) -> String {
        self.timeframe
            .map(|tf| tf.to_string())
            .unwrap_or_else(|| "Unknown".to_string())
    }
}

fn infer_symbol(stem: &str) -> Option<String> {
    let bytes = stem.as_bytes();
    let start = bytes.iter().position(u8::is_ascii_uppercase)?;
    let run_end = |from: usize| {
        bytes[from..]
            .iter()
            .position(|b| !b.is_ascii_uppercase())
            .map_or(bytes.len(), |n| from + n)
    };

    let mut end = run_end(start);
    if bytes.get(end) == Some(&b'/') && bytes.get(end + 1).is_some_and(u8::is_ascii_uppercase) {
        end = run_end(end + 1);
    }
    Some(stem[start..end].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("h4".parse::<Timeframe>().unwrap(), Timeframe::H4);
        assert_eq!(" M15 ".parse::<Timeframe>().unwrap(), Timeframe::M15);
        assert_eq!("mn".parse::<Timeframe>().unwrap(), Timeframe::MN);
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "H2".parse::<Timeframe>().unwrap_err();
        assert_eq!(err.input, "H2");
    }

    #[test]
    fn display_round_trips_labels() {
        for tf in Timeframe::ALL {
            assert_eq!(tf.to_string().parse::<Timeframe>().unwrap(), tf);
        }
    }

    #[test]
    fn durations() {
        assert_eq!(Timeframe::M15.duration(), Duration::minutes(15));
        assert_eq!(Timeframe::H4.duration(), Duration::hours(4));
        assert_eq!(Timeframe::W1.duration(), Duration::days(7));
    }

    #[test]
    fn infers_symbol_and_timeframe() {
        let info = InstrumentInfo::from_file_stem("EURUSD_H1");
        assert_eq!(info.symbol.as_deref(), Some("EURUSD"));
        assert_eq!(info.timeframe, Some(Timeframe::H1));
    }

    #[test]
    fn prefers_whole_segment_over_prefix() {
        let info = InstrumentInfo::from_file_stem("XAUUSD-M15-2025");
        assert_eq!(info.timeframe, Some(Timeframe::M15));
    }

    #[test]
    fn infers_pair_symbol() {
        let info = InstrumentInfo::from_file_stem("BTC/USDT m5");
        assert_eq!(info.symbol.as_deref(), Some("BTC/USDT"));
        assert_eq!(info.timeframe, Some(Timeframe::M5));
    }

    #[test]
    fn unknown_metadata() {
        let info = InstrumentInfo::from_file_stem("prices");
        assert_eq!(info.symbol, None);
        assert_eq!(info.timeframe, None);
        assert_eq!(info.symbol_label(), "Unknown");
        assert_eq!(info.timeframe_label(), "Unknown");
    }
}
