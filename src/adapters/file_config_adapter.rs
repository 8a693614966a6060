//! INI file configuration adapter.
//!
//! Keys are case-insensitive. A key present with an empty value counts as
//! unset, so `account_balance =` disables sizing the same way omitting the
//! key does.

use crate::domain::error::CandlecastError;
use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;
use std::str::FromStr;

const INLINE_SOURCE: &str = "<inline>";

#[derive(Debug)]
pub struct FileConfigAdapter {
    ini: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CandlecastError> {
        let path = path.as_ref();
        let mut ini = Ini::new();
        ini.load(path).map_err(|reason| CandlecastError::ConfigParse {
            file: path.display().to_string(),
            reason,
        })?;
        Ok(Self { ini })
    }

    pub fn from_string(content: &str) -> Result<Self, CandlecastError> {
        let mut ini = Ini::new();
        ini.read(content.to_string())
            .map_err(|reason| CandlecastError::ConfigParse {
                file: INLINE_SOURCE.to_string(),
                reason,
            })?;
        Ok(Self { ini })
    }

    /// An adapter with no keys; every lookup yields its default.
    pub fn empty() -> Self {
        Self { ini: Ini::new() }
    }

    fn parsed<T: FromStr>(&self, section: &str, key: &str) -> Option<T> {
        self.get_string(section, key)?.parse().ok()
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Some(true),
        "false" | "no" | "off" | "0" => Some(false),
        _ => None,
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.ini
            .get(section, key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.parsed(section, key).unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.parsed(section, key).unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.get_string(section, key)
            .and_then(|v| parse_bool(&v))
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_config() {
        let content = r#"
[data]
path = data/EURUSD_H1.csv
timeframe = H1

[prediction]
rsi_period = 14
atr_multiplier = 1.5
"#;
        let adapter = FileConfigAdapter::from_string(content).unwrap();
        assert_eq!(
            adapter.get_string("data", "path"),
            Some("data/EURUSD_H1.csv".to_string())
        );
        assert_eq!(adapter.get_int("prediction", "rsi_period", 0), 14);
        assert_eq!(adapter.get_double("prediction", "atr_multiplier", 0.0), 1.5);
    }

    #[test]
    fn empty_adapter_returns_defaults() {
        let adapter = FileConfigAdapter::empty();
        assert_eq!(adapter.get_string("data", "path"), None);
        assert_eq!(adapter.get_int("prediction", "horizons", 3), 3);
        assert!(adapter.get_bool("report", "rationale", true));
    }

    #[test]
    fn get_string_returns_none_for_missing_key() {
        let adapter = FileConfigAdapter::from_string("[risk]\nrisk_pct = 1\n").unwrap();
        assert_eq!(adapter.get_string("risk", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
    }

    #[test]
    fn get_int_returns_default_for_non_numeric() {
        let adapter = FileConfigAdapter::from_string("[prediction]\nhorizons = abc\n").unwrap();
        assert_eq!(adapter.get_int("prediction", "horizons", 3), 3);
    }

    #[test]
    fn get_double_returns_default_for_non_numeric() {
        let adapter =
            FileConfigAdapter::from_string("[risk]\naccount_balance = lots\n").unwrap();
        assert_eq!(adapter.get_double("risk", "account_balance", 99.9), 99.9);
    }

    #[test]
    fn get_bool_accepts_common_spellings() {
        let adapter =
            FileConfigAdapter::from_string("[report]\na = yes\nb = 0\nc = maybe\n").unwrap();
        assert!(adapter.get_bool("report", "a", false));
        assert!(!adapter.get_bool("report", "b", true));
        assert!(adapter.get_bool("report", "c", true));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config("[risk]\naccount_balance = 10000\n");
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(adapter.get_double("risk", "account_balance", 0.0), 10000.0);
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        let result = FileConfigAdapter::from_file("/nonexistent/path/config.ini");
        assert!(matches!(
            result,
            Err(CandlecastError::ConfigParse { file, .. }) if file.ends_with("config.ini")
        ));
    }

    #[test]
    fn blank_value_counts_as_unset() {
        let adapter =
            FileConfigAdapter::from_string("[risk]\naccount_balance =\nrisk_pct = 2\n").unwrap();
        assert_eq!(adapter.get_string("risk", "account_balance"), None);
        assert_eq!(adapter.get_double("risk", "account_balance", 7.0), 7.0);
        assert_eq!(adapter.get_double("risk", "risk_pct", 1.0), 2.0);
    }

    #[test]
    fn keys_are_case_insensitive() {
        let adapter = FileConfigAdapter::from_string("[Prediction]\nRSI_Period = 9\n").unwrap();
        assert_eq!(adapter.get_int("prediction", "rsi_period", 14), 9);
    }
}
