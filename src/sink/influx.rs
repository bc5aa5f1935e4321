//! InfluxDB 1.x sink using the HTTP line protocol

use super::{MetricsPoint, OutputSink, to_points};
use crate::config::InfluxConfig;
use crate::error::{PowerPiError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::metrics::CircuitMetrics;
use crate::sensor::Snapshot;
use async_trait::async_trait;
use std::time::Duration;

fn escape_with(value: &str, special: &[char]) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        if special.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

fn escape_measurement(value: &str) -> String {
    escape_with(value, &[',', ' '])
}

fn escape_tag(value: &str) -> String {
    escape_with(value, &[',', ' ', '='])
}

/// Render points as line protocol with second-precision timestamps.
///
/// Non-finite fields are left out; a point with no finite field is skipped.
pub fn to_line_protocol(points: &[MetricsPoint], timestamp_secs: i64) -> String {
    points
        .iter()
        .filter_map(|p| {
            let fields: Vec<String> = p
                .field_pairs()
                .iter()
                .filter(|(_, v)| v.is_finite())
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            if fields.is_empty() {
                return None;
            }
            Some(format!(
                "{},sensor={} {} {}",
                escape_measurement(&p.measurement),
                escape_tag(&p.sensor),
                fields.join(","),
                timestamp_secs
            ))
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Writes per-circuit metrics to an InfluxDB database
pub struct InfluxSink {
    client: reqwest::Client,
    config: InfluxConfig,
    logger: StructuredLogger,
}

impl InfluxSink {
    pub fn new(config: &InfluxConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
            logger: get_logger("influxdb"),
        })
    }

    fn write_url(&self) -> String {
        format!("{}/write", self.config.base_url())
    }
}

#[async_trait]
impl OutputSink for InfluxSink {
    async fn emit_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.logger.debug(&format!(
            "Snapshot with {} channels is not stored in InfluxDB",
            snapshot.len()
        ));
        Ok(())
    }

    async fn emit_metrics(&mut self, metrics: &[CircuitMetrics]) -> Result<()> {
        let points = to_points(&self.config.measurement, metrics);
        let body = to_line_protocol(&points, chrono::Utc::now().timestamp());
        if body.is_empty() {
            self.logger.warn("No points to write");
            return Ok(());
        }

        self.logger.debug(&format!(
            "Writing {} points to {} (db={})",
            points.len(),
            self.write_url(),
            self.config.database
        ));

        let response = self
            .client
            .post(self.write_url())
            .query(&[
                ("db", self.config.database.as_str()),
                ("precision", "s"),
            ])
            .basic_auth(&self.config.username, Some(&self.config.password))
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let error_msg = format!("InfluxDB rejected write ({}): {}", status, text.trim());
            self.logger.error(&error_msg);
            return Err(PowerPiError::sink(error_msg));
        }

        self.logger
            .info(&format!("Stored {} circuit records", points.len()));
        Ok(())
    }
}
