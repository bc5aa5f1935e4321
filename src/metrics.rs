//! Derived per-circuit electrical metrics
//!
//! The board is wired in contiguous blocks of `k` channels each:
//!
//! | indices      | quantity        |
//! |--------------|-----------------|
//! | `[0, k)`     | real power      |
//! | `[k, 2k)`    | apparent power  |
//! | `[2k, 3k)`   | current         |
//! | `3k..`       | voltage         |
//!
//! Circuits `0..=k - phase` are derived; the last `phase - 1` current
//! channels are left out as they carry the voltage reference wiring.

use crate::config::{MetricsConfig, Phase};
use crate::error::{PowerPiError, Result};
use crate::logging::get_logger;
use crate::sensor::Snapshot;
use serde::{Deserialize, Serialize};

/// Metrics for one monitored circuit of one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircuitMetrics {
    /// One-based circuit identifier
    pub circuit: usize,
    pub voltage: f64,
    pub current: f64,
    pub real_power: f64,
    pub apparent_power: f64,
    pub power_factor: f64,
    pub frequency: f64,
}

/// Scaled power factor.
///
/// Returns 0.0 when either input is exactly zero, even if only one of them
/// is. Otherwise `1000 * rp / ap` for single phase and
/// `1000 * rp / (3 * ap)` for three phase.
pub fn power_factor(real_power: f64, apparent_power: f64, phase: Phase) -> f64 {
    if real_power == 0.0 || apparent_power == 0.0 {
        return 0.0;
    }
    match phase {
        Phase::Single => 1000.0 * real_power / apparent_power,
        Phase::Three => 1000.0 * real_power / (3.0 * apparent_power),
    }
}

/// Derives [`CircuitMetrics`] from snapshots with a fixed wiring convention
#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    config: MetricsConfig,
}

impl MetricsCalculator {
    /// Create a calculator; the layout constants are checked up front
    pub fn new(config: MetricsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    /// Minimum number of readings a snapshot needs for this layout
    pub fn required_channels(&self) -> usize {
        3 * self.config.circuit_count + 1
    }

    /// Number of circuits derived per snapshot
    pub fn circuit_total(&self) -> usize {
        self.config.circuit_count - self.config.phase.count() + 1
    }

    /// Compute one record per circuit.
    ///
    /// Voltage is always the last reading of the snapshot, whatever the
    /// phase count. Per-phase voltage selection from the wiring is not
    /// modelled.
    pub fn derive(&self, snapshot: &Snapshot) -> Result<Vec<CircuitMetrics>> {
        let k = self.config.circuit_count;
        let required = self.required_channels();
        if snapshot.len() < required {
            return Err(PowerPiError::layout(format!(
                "snapshot has {} channels, {} circuits need at least {}",
                snapshot.len(),
                k,
                required
            )));
        }

        let voltage = snapshot.last().map_or(0.0, |r| r.value);
        let value = |index: usize| -> Result<f64> {
            snapshot
                .value(index)
                .ok_or_else(|| PowerPiError::layout(format!("channel {} is missing", index)))
        };

        let mut circuits = Vec::with_capacity(self.circuit_total());
        for c in 0..self.circuit_total() {
            let real_power = value(c)?;
            let apparent_power = value(c + k)?;
            circuits.push(CircuitMetrics {
                circuit: c + 1,
                voltage,
                current: value(c + 2 * k)?,
                real_power,
                apparent_power,
                power_factor: power_factor(real_power, apparent_power, self.config.phase),
                frequency: self.config.ac_frequency,
            });
        }

        get_logger("metrics").debug(&format!(
            "Derived {} circuits from {} channels",
            circuits.len(),
            snapshot.len()
        ));
        Ok(circuits)
    }
}
