//! Value normalization for raw sensor tokens

use crate::error::{PowerPiError, Result};

/// Readings below this magnitude are board noise (sub-100 mA ghost current)
pub const DEFAULT_NOISE_FLOOR: f64 = 100.0;

/// Cleans raw textual readings under a noise-floor rule
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalizer {
    noise_floor: f64,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(DEFAULT_NOISE_FLOOR)
    }
}

impl Normalizer {
    pub fn new(noise_floor: f64) -> Self {
        Self { noise_floor }
    }

    pub fn noise_floor(&self) -> f64 {
        self.noise_floor
    }

    /// Parse `token` and zero it when its magnitude is under the noise floor.
    ///
    /// Surrounding whitespace and line separators are ignored. A token that
    /// is not numeric yields [`PowerPiError::Parse`].
    pub fn normalize(&self, token: &str) -> Result<f64> {
        let value = parse_token(token)?;
        if value.abs() < self.noise_floor {
            return Ok(0.0);
        }
        Ok(value)
    }
}

/// Parse a single frame token as a float after trimming
pub fn parse_token(token: &str) -> Result<f64> {
    token
        .trim()
        .parse::<f64>()
        .map_err(|_| PowerPiError::parse(token))
}

/// Normalize with the default noise floor
pub fn normalize(token: &str) -> Result<f64> {
    Normalizer::default().normalize(token)
}
