//! # PowerPi - sensor board reader and power metrics publisher
//!
//! Reads a single snapshot from a serial analog-sensor board (one
//! comma-separated line of channel readings), cleans and classifies every
//! channel, and derives per-circuit voltage, current, real and apparent
//! power, power factor and line frequency.
//!
//! ## Architecture
//!
//! - `config`: YAML settings, defaults and validation
//! - `logging`: Structured logging and tracing
//! - `channels`: Channel classification from the board configuration file
//! - `sensor`: Frame reading, value normalization and snapshots
//! - `metrics`: Per-circuit derived metrics
//! - `transport`: Serial port line source
//! - `sink`: JSON and InfluxDB outputs
//! - `pipeline`: One capture/derive/emit cycle per run

pub mod channels;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod pipeline;
pub mod sensor;
pub mod sink;
pub mod transport;

mod config_tests;

// Re-export commonly used types
pub use channels::{ChannelLayout, QuantityKind};
pub use config::Config;
pub use error::{PowerPiError, Result};
pub use metrics::{CircuitMetrics, MetricsCalculator, power_factor};
pub use pipeline::Pipeline;
pub use sensor::{SensorReading, Snapshot};

/// Application version, including nightly suffix when built as such
pub const VERSION: &str = env!("APP_VERSION");
