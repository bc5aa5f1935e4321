//! Frame reader: turns transport lines into one all-numeric frame
//!
//! The board prints garbage right after the port opens, so the first line is
//! always discarded. The next line must be a comma-separated record in which
//! every token is a number. The reader stops at the first valid frame; it is
//! not a streaming reader.

use crate::error::{PowerPiError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::sensor::normalize::parse_token;
use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::time::timeout;

/// Field delimiter within a frame line
pub const DELIMITER: char = ',';

/// Source of text lines with a bounded wait per read
#[async_trait]
pub trait LineSource: Send {
    /// Read the next line without its terminator.
    ///
    /// Fails with [`PowerPiError::Timeout`] when nothing arrives in time and
    /// with [`PowerPiError::Transport`] on I/O failure or end of stream.
    async fn read_line(&mut self) -> Result<String>;

    /// Release the underlying resource; further reads fail
    async fn close(&mut self) -> Result<()>;
}

/// Timeout-bounded line reader over any buffered async byte stream
pub struct TimedLines<R> {
    reader: Option<R>,
    read_timeout: Duration,
    logger: StructuredLogger,
}

impl<R> TimedLines<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    pub fn new(reader: R, read_timeout: Duration) -> Self {
        Self::with_logger(reader, read_timeout, get_logger("transport"))
    }

    pub fn with_logger(reader: R, read_timeout: Duration, logger: StructuredLogger) -> Self {
        Self {
            reader: Some(reader),
            read_timeout,
            logger,
        }
    }

    pub fn is_open(&self) -> bool {
        self.reader.is_some()
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }
}

#[async_trait]
impl<R> LineSource for TimedLines<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn read_line(&mut self) -> Result<String> {
        let deadline = self.read_timeout;
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| PowerPiError::transport("Line source is closed"))?;

        let mut buf = Vec::with_capacity(128);
        match timeout(deadline, reader.read_until(b'\n', &mut buf)).await {
            Ok(Ok(0)) => {
                let msg = "Stream ended before a line was received";
                self.logger.error(msg);
                Err(PowerPiError::transport(msg))
            }
            Ok(Ok(n)) => {
                // Boot noise is not guaranteed to be UTF-8
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\r', '\n']).to_string();
                self.logger.trace(&format!("Read {} bytes: {:?}", n, line));
                Ok(line)
            }
            Ok(Err(e)) => {
                let error_msg = format!("Failed to read line: {}", e);
                self.logger.error(&error_msg);
                Err(PowerPiError::transport(error_msg))
            }
            Err(_) => {
                let error_msg = format!("No data within {:?}", deadline);
                self.logger.error(&error_msg);
                Err(PowerPiError::timeout(error_msg))
            }
        }
    }

    async fn close(&mut self) -> Result<()> {
        if self.reader.take().is_some() {
            self.logger.debug("Line source closed");
        }
        Ok(())
    }
}

/// One accepted line: every token is known to parse as a float
#[derive(Debug, Clone, PartialEq)]
pub struct RawFrame {
    tokens: Vec<String>,
}

impl RawFrame {
    /// Raw tokens in channel order
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Split a line and accept it only if every token is numeric.
///
/// The whole line is rejected with [`PowerPiError::Decode`] otherwise; there
/// are no partial frames.
pub fn decode_line(line: &str) -> Result<RawFrame> {
    let tokens: Vec<String> = line.split(DELIMITER).map(str::to_string).collect();
    if tokens.iter().all(|t| parse_token(t).is_ok()) {
        Ok(RawFrame { tokens })
    } else {
        Err(PowerPiError::decode(line))
    }
}

/// Reads a single frame from a [`LineSource`]
#[derive(Debug, Clone)]
pub struct FrameReader {
    decode_retries: u32,
    logger: StructuredLogger,
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReader {
    /// Reader that stops at the first non-numeric line after the discard
    pub fn new() -> Self {
        Self::with_retries(0)
    }

    /// Reader that skips up to `decode_retries` non-numeric lines
    pub fn with_retries(decode_retries: u32) -> Self {
        Self {
            decode_retries,
            logger: get_logger("frame"),
        }
    }

    pub fn decode_retries(&self) -> u32 {
        self.decode_retries
    }

    /// Discard one line, then return the first all-numeric frame.
    ///
    /// Transport failures (including timeouts) propagate unchanged. Once the
    /// retry budget is spent the last rejected line is reported as
    /// [`PowerPiError::Decode`].
    pub async fn read_frame<S>(&self, source: &mut S) -> Result<RawFrame>
    where
        S: LineSource + ?Sized,
    {
        let discarded = source.read_line().await?;
        self.logger
            .debug(&format!("Discarded settling line: {:?}", discarded));

        let mut rejected = 0u32;
        loop {
            let line = source.read_line().await?;
            match decode_line(&line) {
                Ok(frame) => {
                    self.logger
                        .debug(&format!("Accepted frame with {} channels", frame.len()));
                    return Ok(frame);
                }
                Err(e) if rejected < self.decode_retries => {
                    rejected += 1;
                    self.logger.warn(&format!(
                        "Skipping line {}/{}: {}",
                        rejected, self.decode_retries, e
                    ));
                }
                Err(e) => {
                    self.logger.error(&e.to_string());
                    return Err(e);
                }
            }
        }
    }
}
