//! Error types and handling for PowerPi
//!
//! This module defines the error types used throughout the application,
//! providing consistent error handling and reporting.
//!
//! Channel configuration problems are deliberately absent from this enum:
//! the channel resolver degrades to `QuantityKind::Unknown` instead of
//! failing (see [`crate::channels`]).

use thiserror::Error;

/// Result type alias for PowerPi operations
pub type Result<T> = std::result::Result<T, PowerPiError>;

/// Main error type for PowerPi
#[derive(Debug, Error)]
pub enum PowerPiError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Serial port could not be opened, a read failed or the stream ended
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// A transport read produced no data before its deadline
    #[error("Timeout error: {message}")]
    Timeout { message: String },

    /// A line failed the all-numeric frame test
    #[error("Decode error: line is not an all-numeric frame: {line:?}")]
    Decode { line: String },

    /// A single token could not be parsed as a number
    #[error("Parse error: {token:?} is not numeric")]
    Parse { token: String },

    /// Snapshot does not match the configured channel layout
    #[error("Layout error: {message}")]
    Layout { message: String },

    /// Serialization/deserialization errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {message}")]
    Io { message: String },

    /// Network-related errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// Output sink rejected the records
    #[error("Sink error: {message}")]
    Sink { message: String },

    /// Validation errors
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },
}

impl PowerPiError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        PowerPiError::Config {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        PowerPiError::Transport {
            message: message.into(),
        }
    }

    /// Create a new timeout error
    pub fn timeout<S: Into<String>>(message: S) -> Self {
        PowerPiError::Timeout {
            message: message.into(),
        }
    }

    /// Create a new decode error carrying the offending line
    pub fn decode<S: Into<String>>(line: S) -> Self {
        PowerPiError::Decode { line: line.into() }
    }

    /// Create a new per-token parse error
    pub fn parse<S: Into<String>>(token: S) -> Self {
        PowerPiError::Parse {
            token: token.into(),
        }
    }

    /// Create a new layout error
    pub fn layout<S: Into<String>>(message: S) -> Self {
        PowerPiError::Layout {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(field: S, message: S) -> Self {
        PowerPiError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        PowerPiError::Io {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        PowerPiError::Network {
            message: message.into(),
        }
    }

    /// Create a new sink error
    pub fn sink<S: Into<String>>(message: S) -> Self {
        PowerPiError::Sink {
            message: message.into(),
        }
    }

    /// Whether this error came from the transport (open, read or timeout)
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            PowerPiError::Transport { .. } | PowerPiError::Timeout { .. }
        )
    }

    /// Whether the received data was rejected as not being a valid frame
    pub fn is_decode(&self) -> bool {
        matches!(self, PowerPiError::Decode { .. } | PowerPiError::Parse { .. })
    }
}

impl From<std::io::Error> for PowerPiError {
    fn from(err: std::io::Error) -> Self {
        PowerPiError::io(err.to_string())
    }
}

impl From<serde_yaml::Error> for PowerPiError {
    fn from(err: serde_yaml::Error) -> Self {
        PowerPiError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for PowerPiError {
    fn from(err: serde_json::Error) -> Self {
        PowerPiError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<tokio_serial::Error> for PowerPiError {
    fn from(err: tokio_serial::Error) -> Self {
        PowerPiError::transport(err.to_string())
    }
}

#[cfg(feature = "influxdb")]
impl From<reqwest::Error> for PowerPiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PowerPiError::timeout(err.to_string())
        } else {
            PowerPiError::network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = PowerPiError::config("test config error");
        assert!(matches!(err, PowerPiError::Config { .. }));

        let err = PowerPiError::decode("a,b");
        assert!(matches!(err, PowerPiError::Decode { .. }));

        let err = PowerPiError::validation("field", "test validation error");
        assert!(matches!(err, PowerPiError::Validation { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = PowerPiError::config("test error");
        let error_string = format!("{}", err);
        assert_eq!(error_string, "Configuration error: test error");

        let err = PowerPiError::validation("test_field", "invalid value");
        let error_string = format!("{}", err);
        assert_eq!(error_string, "Validation error: test_field - invalid value");

        let err = PowerPiError::decode("not,numeric");
        assert!(err.to_string().contains("\"not,numeric\""));
    }

    #[test]
    fn test_error_classification() {
        assert!(PowerPiError::timeout("read").is_transport());
        assert!(PowerPiError::transport("open").is_transport());
        assert!(!PowerPiError::decode("x").is_transport());
        assert!(PowerPiError::decode("x").is_decode());
        assert!(PowerPiError::parse("x").is_decode());
        assert!(!PowerPiError::timeout("read").is_decode());
    }
}
