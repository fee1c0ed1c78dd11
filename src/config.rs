//! Configuration for the thermolink application
//!
//! Loads configuration from a TOML file. Every field has a default
//! matching the Arduino logger's fixed protocol parameters, so running
//! without a config file is fully supported.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub serial: SerialConfig,
    pub discovery: DiscoverySettings,
    pub output: OutputConfig,
    pub logging: LoggingConfig,
}

/// Serial link configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Baud rate of the logger's UART (the firmware is fixed at 19200)
    pub baud_rate: u32,
    /// Number of channel identifiers to scan, starting at 0
    pub channel_count: u8,
}

/// Discovery/handshake tuning
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DiscoverySettings {
    /// Delay after opening a port before the first handshake poll,
    /// covering the device's boot time (ms)
    pub settle_ms: u64,
    /// Spacing between handshake polls on one channel (ms)
    pub poll_interval_ms: u64,
    /// Handshake polls per channel before it is written off
    pub attempt_budget: u32,
    /// Presence byte the logger emits while waiting for a host
    /// (the firmware sends ASCII 'W' at 200 Hz)
    pub sentinel: u8,
}

/// Record file output configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory record files are created in
    pub directory: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for SerialConfig {
    fn default() -> Self {
        SerialConfig {
            baud_rate: 19200,
            channel_count: 20,
        }
    }
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        DiscoverySettings {
            settle_ms: 1700,
            poll_interval_ms: 5,
            attempt_budget: 100,
            sentinel: b'W',
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            directory: ".".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            level: "info".to_string(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            serial: SerialConfig::default(),
            discovery: DiscoverySettings::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_logger_protocol() {
        let config = AppConfig::default();
        assert_eq!(config.serial.baud_rate, 19200);
        assert_eq!(config.serial.channel_count, 20);
        assert_eq!(config.discovery.settle_ms, 1700);
        assert_eq!(config.discovery.poll_interval_ms, 5);
        assert_eq!(config.discovery.attempt_budget, 100);
        assert_eq!(config.discovery.sentinel, b'W');
        assert_eq!(config.output.directory, ".");
    }

    #[test]
    fn test_toml_serialization() {
        let config = AppConfig::default();
        let toml_string = toml::to_string_pretty(&config).unwrap();

        assert!(toml_string.contains("[serial]"));
        assert!(toml_string.contains("[discovery]"));
        assert!(toml_string.contains("[output]"));
        assert!(toml_string.contains("[logging]"));
        assert!(toml_string.contains("baud_rate = 19200"));
        assert!(toml_string.contains("attempt_budget = 100"));
    }

    #[test]
    fn test_toml_deserialization() {
        let toml_content = r#"
[serial]
baud_rate = 9600
channel_count = 4

[discovery]
settle_ms = 100
poll_interval_ms = 1
attempt_budget = 10
sentinel = 81

[output]
directory = "/var/log/thermolink"

[logging]
level = "debug"
"#;

        let config: AppConfig = toml::from_str(toml_content).unwrap();
        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.serial.channel_count, 4);
        assert_eq!(config.discovery.sentinel, b'Q');
        assert_eq!(config.output.directory, "/var/log/thermolink");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: AppConfig = toml::from_str("[serial]\nbaud_rate = 57600\n").unwrap();
        assert_eq!(config.serial.baud_rate, 57600);
        // Unspecified sections keep protocol defaults
        assert_eq!(config.serial.channel_count, 20);
        assert_eq!(config.discovery.sentinel, b'W');
    }
}
