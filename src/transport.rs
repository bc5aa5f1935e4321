//! Serial transport for the sensor board
//!
//! Opens the configured port with `tokio-serial` and exposes it as a
//! timeout-bounded [`crate::sensor::LineSource`]. Dropping the returned source closes the
//! port as well, so early returns cannot leak the device.

use crate::config::SerialConfig;
use crate::error::{PowerPiError, Result};
use crate::logging::{LogContext, get_logger_with_context};
use crate::sensor::frame::TimedLines;
use tokio::io::BufReader;
use tokio_serial::{SerialPortBuilderExt, SerialStream};

/// Line source backed by an open serial port
pub type SerialLines = TimedLines<BufReader<SerialStream>>;

/// Open the board's serial port.
///
/// Fails with [`PowerPiError::Transport`] when the device cannot be opened.
pub fn open_serial(config: &SerialConfig) -> Result<SerialLines> {
    let logger = get_logger_with_context(LogContext::new("transport").with_port(&config.port));
    logger.info(&format!(
        "Opening serial port at {} baud, read timeout {:?}",
        config.baud_rate,
        config.read_timeout()
    ));

    let stream = tokio_serial::new(config.port.as_str(), config.baud_rate)
        .timeout(config.read_timeout())
        .open_native_async()
        .map_err(|e| {
            let error_msg = format!("Failed to open serial port {}: {}", config.port, e);
            logger.error(&error_msg);
            PowerPiError::transport(error_msg)
        })?;

    Ok(TimedLines::with_logger(
        BufReader::new(stream),
        config.read_timeout(),
        logger,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn open_missing_device_is_a_transport_error() {
        let cfg = SerialConfig {
            port: "/dev/powerpi-does-not-exist".to_string(),
            ..Default::default()
        };
        let err = open_serial(&cfg).err().unwrap();
        assert!(matches!(err, PowerPiError::Transport { .. }));
        assert!(err.to_string().contains("/dev/powerpi-does-not-exist"));
    }
}
