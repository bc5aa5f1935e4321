//! Configuration management for PowerPi
//!
//! This module handles loading, validation, and management of the application
//! settings from YAML files. Command line flags are layered on top by the
//! binary via [`Config::apply_overrides`].

use crate::error::{PowerPiError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod defaults;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial transport settings
    pub serial: SerialConfig,

    /// Channel classification and value cleaning
    pub channels: ChannelsConfig,

    /// Deployment constants for derived metrics
    pub metrics: MetricsConfig,

    /// InfluxDB output settings
    pub influxdb: InfluxConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Serial port parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Device path of the sensor board (e.g. /dev/ttyS0)
    pub port: String,

    /// Baud rate of the board's serial output
    pub baud_rate: u32,

    /// Per-read timeout in seconds
    pub timeout_secs: u64,

    /// Non-numeric lines tolerated after the initial discard before the
    /// read is reported as a decode failure (0 stops at the first one)
    pub decode_retries: u32,
}

/// Channel configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelsConfig {
    /// Sensor board configuration file with `addchannel` declarations
    pub config_file: Option<PathBuf>,

    /// Readings with a smaller magnitude are treated as noise and zeroed
    pub noise_floor: f64,
}

/// Phase wiring of the monitored installation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Phase {
    Single,
    Three,
}

impl Phase {
    /// Number of phases as an integer
    pub fn count(self) -> usize {
        match self {
            Phase::Single => 1,
            Phase::Three => 3,
        }
    }
}

impl TryFrom<u8> for Phase {
    type Error = String;

    fn try_from(value: u8) -> std::result::Result<Self, Self::Error> {
        match value {
            1 => Ok(Phase::Single),
            3 => Ok(Phase::Three),
            other => Err(format!("unsupported phase count {other}, expected 1 or 3")),
        }
    }
}

impl From<Phase> for u8 {
    fn from(phase: Phase) -> Self {
        phase.count() as u8
    }
}

/// Deployment constants used to derive per-circuit metrics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Number of current sensors (monitored circuits) attached to the board
    pub circuit_count: usize,

    /// Single or three phase wiring
    pub phase: Phase,

    /// Grid frequency in Hz; configured, never measured
    pub ac_frequency: f64,
}

/// InfluxDB 1.x write endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluxConfig {
    /// Whether `publish` writes to InfluxDB (otherwise metrics go to stdout)
    pub enabled: bool,

    /// Host name of the InfluxDB server
    pub host: String,

    /// HTTP port
    pub port: u16,

    /// Target database
    pub database: String,

    /// User name
    pub username: String,

    /// Password
    pub password: String,

    /// Measurement name for per-circuit records
    pub measurement: String,

    /// HTTP request timeout in seconds
    pub timeout_secs: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    pub level: String,

    /// Optional log file path; a daily rolling file is written next to it
    pub file: Option<String>,

    /// Number of rotated files to keep
    pub backup_count: u32,

    /// Whether to log to the console (stderr)
    pub console_output: bool,

    /// Whether to use JSON format
    pub json_format: bool,
}

/// Values supplied on the command line; `None` keeps the YAML value
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub port: Option<String>,
    pub baud_rate: Option<u32>,
    pub timeout_secs: Option<u64>,
    pub channel_config: Option<PathBuf>,
}

impl SerialConfig {
    /// Per-read deadline as a duration
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl InfluxConfig {
    /// Base URL of the write endpoint
    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from an explicit path, or from the first default
    /// location that exists, falling back to built-in defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let default_paths = ["powerpi.yaml", "/etc/powerpi/config.yaml"];

        for path in &default_paths {
            if Path::new(path).exists() {
                return Self::from_file(path);
            }
        }

        Ok(Config::default())
    }

    /// Save configuration to a YAML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }

    /// Layer command line values over the loaded settings
    pub fn apply_overrides(&mut self, overrides: Overrides) {
        if let Some(port) = overrides.port {
            self.serial.port = port;
        }
        if let Some(baud_rate) = overrides.baud_rate {
            self.serial.baud_rate = baud_rate;
        }
        if let Some(timeout_secs) = overrides.timeout_secs {
            self.serial.timeout_secs = timeout_secs;
        }
        if let Some(path) = overrides.channel_config {
            self.channels.config_file = Some(path);
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.serial.port.is_empty() {
            return Err(PowerPiError::validation(
                "serial.port",
                "Port cannot be empty",
            ));
        }

        if self.serial.baud_rate == 0 {
            return Err(PowerPiError::validation(
                "serial.baud_rate",
                "Must be greater than 0",
            ));
        }

        if self.serial.timeout_secs == 0 {
            return Err(PowerPiError::validation(
                "serial.timeout_secs",
                "Must be greater than 0",
            ));
        }

        if !self.channels.noise_floor.is_finite() || self.channels.noise_floor < 0.0 {
            return Err(PowerPiError::validation(
                "channels.noise_floor",
                "Must be a non-negative number",
            ));
        }

        self.metrics.validate()?;

        if self.influxdb.enabled {
            if self.influxdb.host.is_empty() {
                return Err(PowerPiError::validation(
                    "influxdb.host",
                    "Host cannot be empty",
                ));
            }
            if self.influxdb.port == 0 {
                return Err(PowerPiError::validation(
                    "influxdb.port",
                    "Port must be greater than 0",
                ));
            }
            if self.influxdb.database.is_empty() {
                return Err(PowerPiError::validation(
                    "influxdb.database",
                    "Database cannot be empty",
                ));
            }
        }

        Ok(())
    }
}

impl MetricsConfig {
    /// Validate the layout constants
    pub fn validate(&self) -> Result<()> {
        if self.circuit_count < self.phase.count() {
            return Err(PowerPiError::validation(
                "metrics.circuit_count",
                "Must be at least the phase count",
            ));
        }

        if !self.ac_frequency.is_finite() || self.ac_frequency <= 0.0 {
            return Err(PowerPiError::validation(
                "metrics.ac_frequency",
                "Must be positive",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_from_integer() {
        assert_eq!(Phase::try_from(1u8).unwrap(), Phase::Single);
        assert_eq!(Phase::try_from(3u8).unwrap(), Phase::Three);
        assert!(Phase::try_from(2u8).is_err());
        assert_eq!(u8::from(Phase::Three), 3);
    }

    #[test]
    fn test_phase_yaml_rejects_unknown_count() {
        let err = serde_yaml::from_str::<MetricsConfig>("phase: 2").unwrap_err();
        assert!(err.to_string().contains("unsupported phase count"));
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        config.apply_overrides(Overrides {
            port: Some("/dev/ttyAMA0".to_string()),
            baud_rate: None,
            timeout_secs: Some(9),
            channel_config: Some(PathBuf::from("current.conf")),
        });
        assert_eq!(config.serial.port, "/dev/ttyAMA0");
        assert_eq!(config.serial.baud_rate, 38400);
        assert_eq!(config.serial.read_timeout(), Duration::from_secs(9));
        assert_eq!(
            config.channels.config_file.as_deref(),
            Some(Path::new("current.conf"))
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: Config = serde_yaml::from_str("metrics:\n  phase: 3\n").unwrap();
        assert_eq!(config.metrics.phase, Phase::Three);
        assert_eq!(config.metrics.circuit_count, 7);
        assert_eq!(config.serial.port, "/dev/ttyS0");
    }
}
