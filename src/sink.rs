//! Output sinks for snapshots and derived metrics
//!
//! A sink gets at most one emission attempt per run and never retries.
//! Records are fully built before they are handed over.

#[cfg(feature = "influxdb")]
pub mod influx;

use crate::error::Result;
use crate::metrics::CircuitMetrics;
use crate::sensor::Snapshot;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::io::Write;

#[cfg(feature = "influxdb")]
pub use influx::InfluxSink;

/// Destination for the records of one run
#[async_trait]
pub trait OutputSink: Send {
    /// Hand over the raw snapshot (inspection/debug output)
    async fn emit_snapshot(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Hand over the per-circuit records (storage)
    async fn emit_metrics(&mut self, metrics: &[CircuitMetrics]) -> Result<()>;
}

/// Field set of one stored point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PointFields {
    pub voltage: f64,
    pub current: f64,
    pub real_power: f64,
    pub apparent_power: f64,
    pub power_factor: f64,
    pub frequency: f64,
}

/// Per-circuit record in the shape a time-series backend stores it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsPoint {
    pub measurement: String,
    /// Circuit identifier tag
    pub sensor: String,
    pub fields: PointFields,
}

impl MetricsPoint {
    pub fn new(measurement: &str, metrics: &CircuitMetrics) -> Self {
        Self {
            measurement: measurement.to_string(),
            sensor: metrics.circuit.to_string(),
            fields: PointFields {
                voltage: metrics.voltage,
                current: metrics.current,
                real_power: metrics.real_power,
                apparent_power: metrics.apparent_power,
                power_factor: metrics.power_factor,
                frequency: metrics.frequency,
            },
        }
    }

    /// Fields as ordered name/value pairs
    pub fn field_pairs(&self) -> [(&'static str, f64); 6] {
        let f = &self.fields;
        [
            ("Voltage", f.voltage),
            ("Current", f.current),
            ("RealPower", f.real_power),
            ("ApparentPower", f.apparent_power),
            ("PowerFactor", f.power_factor),
            ("Frequency", f.frequency),
        ]
    }
}

/// Convert a run's metrics into stored points
pub fn to_points(measurement: &str, metrics: &[CircuitMetrics]) -> Vec<MetricsPoint> {
    metrics
        .iter()
        .map(|m| MetricsPoint::new(measurement, m))
        .collect()
}

/// Pretty JSON written to any writer (stdout for the CLI)
pub struct JsonSink<W> {
    writer: W,
    measurement: String,
}

impl JsonSink<std::io::Stdout> {
    pub fn stdout(measurement: &str) -> Self {
        Self::new(std::io::stdout(), measurement)
    }
}

impl<W: Write + Send> JsonSink<W> {
    pub fn new(writer: W, measurement: &str) -> Self {
        Self {
            writer,
            measurement: measurement.to_string(),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write_json<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(self.writer, "{}", json)?;
        self.writer.flush()?;
        Ok(())
    }
}

#[async_trait]
impl<W: Write + Send> OutputSink for JsonSink<W> {
    async fn emit_snapshot(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.write_json(&snapshot.to_record())
    }

    async fn emit_metrics(&mut self, metrics: &[CircuitMetrics]) -> Result<()> {
        let points = to_points(&self.measurement, metrics);
        self.write_json(&points)
    }
}
