//! Service configuration, loaded from a YAML file.
//!
//! Every section has defaults, so an empty file yields a runnable config.

use serde::Deserialize;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::encoding::date::DisplayClock;
use crate::encoding::qr::{LetterKeys, DEFAULT_SCAN_BASE_URL};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Could not parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub qr: QrConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "ApiConfig::default_host")]
    pub host: String,
    #[serde(default = "ApiConfig::default_port")]
    pub port: u16,
}

impl ApiConfig {
    fn default_host() -> String {
        "127.0.0.1".to_string()
    }

    const fn default_port() -> u16 {
        3000
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            host: ApiConfig::default_host(),
            port: ApiConfig::default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QrConfig {
    /// Leading letters emitted in the QR payload, in order.
    #[serde(default = "QrConfig::default_letters")]
    pub letters: Vec<String>,
    #[serde(default = "QrConfig::default_scan_base_url")]
    pub scan_base_url: String,
}

impl QrConfig {
    fn default_letters() -> Vec<String> {
        LetterKeys::default()
            .iter()
            .map(|letter| letter.to_string())
            .collect()
    }

    fn default_scan_base_url() -> String {
        DEFAULT_SCAN_BASE_URL.to_string()
    }

    pub fn letter_keys(&self) -> Result<LetterKeys, ConfigError> {
        let mut letters = Vec::with_capacity(self.letters.len());
        for entry in &self.letters {
            let mut chars = entry.chars();
            match (chars.next(), chars.next()) {
                (Some(letter), None) if letter.is_alphabetic() => letters.push(letter),
                _ => {
                    return Err(ConfigError::Invalid {
                        field: "qr.letters",
                        reason: format!("{:?} is not a single letter", entry),
                    })
                }
            }
        }
        Ok(LetterKeys::new(letters))
    }
}

impl Default for QrConfig {
    fn default() -> Self {
        QrConfig {
            letters: QrConfig::default_letters(),
            scan_base_url: QrConfig::default_scan_base_url(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DisplayConfig {
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl DisplayConfig {
    pub fn clock(&self) -> Result<DisplayClock, ConfigError> {
        DisplayClock::with_offset_minutes(self.utc_offset_minutes).ok_or_else(|| {
            ConfigError::Invalid {
                field: "display.utc_offset_minutes",
                reason: format!("{} is outside +/-23:59", self.utc_offset_minutes),
            }
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    #[serde(default = "LogConfig::default_level")]
    pub level: LogLevel,
    #[serde(default = "LogConfig::default_format")]
    pub format: LogFormat,
}

impl LogConfig {
    pub const fn default_level() -> LogLevel {
        LogLevel::Info
    }

    pub const fn default_format() -> LogFormat {
        LogFormat::Text
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: LogConfig::default_level(),
            format: LogConfig::default_format(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[serde(alias = "Pretty", alias = "PRETTY")]
    Pretty,
    #[serde(alias = "Json", alias = "JSON")]
    Json,
    #[serde(alias = "Text", alias = "TEXT")]
    Text,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[serde(alias = "Error", alias = "ERROR")]
    Error,
    #[serde(alias = "Warn", alias = "WARN")]
    Warn,
    #[serde(alias = "Info", alias = "INFO")]
    Info,
    #[serde(alias = "Debug", alias = "DEBUG")]
    Debug,
    #[serde(alias = "Trace", alias = "TRACE")]
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        };
        write!(f, "{s}")
    }
}

pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    // An empty document deserializes as unit, not as an empty map
    if yaml.trim().is_empty() {
        return Ok(Config::default());
    }
    let config: Config = serde_yaml::from_str(yaml)?;
    config.qr.letter_keys()?;
    config.display.clock()?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse_config(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.api.port, 3000);
        assert_eq!(config.qr.letters, vec!["A", "P", "N", "M", "D"]);
        assert_eq!(config.qr.scan_base_url, "http://localhost:3000");
        assert_eq!(config.display.utc_offset_minutes, 0);
        assert_eq!(config.log.level, LogLevel::Info);
    }

    #[test]
    fn test_partial_config() {
        let yaml = "api:\n  port: 8080\nlog:\n  level: DEBUG\n  format: json\n";
        let config = parse_config(yaml).unwrap();
        assert_eq!(config.api.host, "127.0.0.1");
        assert_eq!(config.api.port, 8080);
        assert_eq!(config.log.level, LogLevel::Debug);
        assert_eq!(config.log.format, LogFormat::Json);
    }

    #[test]
    fn test_custom_letters() {
        let config = parse_config("qr:\n  letters: [\"d\", \"A\"]\n").unwrap();
        let keys = config.qr.letter_keys().unwrap();
        assert_eq!(keys.iter().collect::<Vec<_>>(), vec!['D', 'A']);
    }

    #[test]
    fn test_rejects_multi_char_letter() {
        let result = parse_config("qr:\n  letters: [\"AB\"]\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid { field: "qr.letters", .. })
        ));
    }

    #[test]
    fn test_rejects_offset_out_of_range() {
        let result = parse_config("display:\n  utc_offset_minutes: 1440\n");
        assert!(matches!(result, Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(matches!(
            parse_config("api: [unclosed"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config(Path::new("/nonexistent/rxcode.yaml"));
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
