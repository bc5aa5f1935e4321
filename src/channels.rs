//! Channel configuration resolver
//!
//! The sensor board's own configuration file declares one channel per
//! `addchannel` line. Line order defines the channel index and the third
//! whitespace-separated field carries the quantity-kind code:
//!
//! ```text
//! addchannel 0 1    # channel 0: real power
//! addchannel 1 3    # channel 1: voltage
//! ```
//!
//! Resolution is best effort and infallible. A missing or unreadable file,
//! a malformed declaration or an index without a declaration all resolve to
//! [`QuantityKind::Unknown`]; nothing here ever returns an error.

use crate::logging::get_logger;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Marker that starts a channel declaration line
pub const CHANNEL_MARKER: &str = "addchannel";

/// Zero-based field position of the kind code within a declaration
pub const KIND_FIELD: usize = 2;

/// Physical quantity measured by a channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuantityKind {
    None,
    RealPower,
    ApparentPower,
    Voltage,
    Current,
    Unknown,
}

impl QuantityKind {
    /// Map a board kind code to a quantity; codes outside the table are `Unknown`
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => QuantityKind::None,
            1 => QuantityKind::RealPower,
            2 => QuantityKind::ApparentPower,
            3 => QuantityKind::Voltage,
            4 => QuantityKind::Current,
            _ => QuantityKind::Unknown,
        }
    }

    /// Label used in emitted records
    pub fn as_str(&self) -> &'static str {
        match self {
            QuantityKind::None => "None",
            QuantityKind::RealPower => "RealPower",
            QuantityKind::ApparentPower => "ApparentPower",
            QuantityKind::Voltage => "Voltage",
            QuantityKind::Current => "Current",
            QuantityKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for QuantityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Channel kinds in declaration order, resolved once per run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelLayout {
    kinds: Vec<QuantityKind>,
}

impl ChannelLayout {
    /// Parse declarations from configuration text
    pub fn parse(text: &str) -> Self {
        let kinds = text
            .lines()
            .filter(|line| line.starts_with(CHANNEL_MARKER))
            .map(parse_declaration)
            .collect();
        Self { kinds }
    }

    /// Read and parse a configuration file.
    ///
    /// `None` or an unreadable file yields an empty layout, so every channel
    /// resolves to `Unknown`.
    pub fn load(path: Option<&Path>) -> Self {
        let logger = get_logger("channels");
        let Some(path) = path else {
            logger.debug("No channel configuration given; all channels are Unknown");
            return Self::default();
        };

        match std::fs::read_to_string(path) {
            Ok(text) => {
                let layout = Self::parse(&text);
                logger.debug(&format!(
                    "Resolved {} channel declarations from {}",
                    layout.len(),
                    path.display()
                ));
                layout
            }
            Err(e) => {
                logger.warn(&format!(
                    "Cannot read channel configuration {}: {}; all channels are Unknown",
                    path.display(),
                    e
                ));
                Self::default()
            }
        }
    }

    /// Quantity measured by channel `index`; `Unknown` when undeclared
    pub fn kind(&self, index: usize) -> QuantityKind {
        self.kinds
            .get(index)
            .copied()
            .unwrap_or(QuantityKind::Unknown)
    }

    /// Number of declared channels
    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    /// Whether no channel was declared
    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }

    /// Declared kinds in channel order
    pub fn kinds(&self) -> &[QuantityKind] {
        &self.kinds
    }
}

fn parse_declaration(line: &str) -> QuantityKind {
    line.split_whitespace()
        .nth(KIND_FIELD)
        .and_then(|field| field.parse::<i64>().ok())
        .map_or(QuantityKind::Unknown, QuantityKind::from_code)
}

/// Resolve the quantity of one channel straight from an optional file.
///
/// Always succeeds: every failure resolves to [`QuantityKind::Unknown`].
/// Prefer loading a [`ChannelLayout`] once when resolving a whole frame.
pub fn resolve_channel_kind(config_file: Option<&Path>, index: usize) -> QuantityKind {
    ChannelLayout::load(config_file).kind(index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_codes_map_to_closed_set() {
        assert_eq!(QuantityKind::from_code(0), QuantityKind::None);
        assert_eq!(QuantityKind::from_code(1), QuantityKind::RealPower);
        assert_eq!(QuantityKind::from_code(2), QuantityKind::ApparentPower);
        assert_eq!(QuantityKind::from_code(3), QuantityKind::Voltage);
        assert_eq!(QuantityKind::from_code(4), QuantityKind::Current);
        assert_eq!(QuantityKind::from_code(5), QuantityKind::Unknown);
        assert_eq!(QuantityKind::from_code(-1), QuantityKind::Unknown);
    }

    #[test]
    fn declarations_resolve_in_line_order() {
        let layout = ChannelLayout::parse("addchannel 0 1\naddchannel 1 3\naddchannel 2 4\n");
        assert_eq!(layout.kind(0), QuantityKind::RealPower);
        assert_eq!(layout.kind(1), QuantityKind::Voltage);
        assert_eq!(layout.kind(2), QuantityKind::Current);
        assert_eq!(layout.kind(3), QuantityKind::Unknown);
    }

    #[test]
    fn other_lines_do_not_shift_indices() {
        let text = "# board setup\nreset\naddchannel 0 2\n  addchannel 9 9 9\nset rate 10\naddchannel 1 0\n";
        let layout = ChannelLayout::parse(text);
        assert_eq!(layout.len(), 2);
        assert_eq!(layout.kinds(), &[QuantityKind::ApparentPower, QuantityKind::None]);
    }

    #[test]
    fn malformed_declarations_keep_their_slot() {
        let layout = ChannelLayout::parse("addchannel 0\naddchannel 1 x\naddchannel\t2\t4\n");
        assert_eq!(layout.kind(0), QuantityKind::Unknown);
        assert_eq!(layout.kind(1), QuantityKind::Unknown);
        assert_eq!(layout.kind(2), QuantityKind::Current);
    }

    #[test]
    fn missing_source_is_unknown() {
        assert_eq!(resolve_channel_kind(None, 0), QuantityKind::Unknown);
        assert_eq!(
            resolve_channel_kind(Some(Path::new("/nonexistent/powerpi/current.conf")), 0),
            QuantityKind::Unknown
        );
    }

    #[test]
    fn labels_match_display() {
        assert_eq!(QuantityKind::ApparentPower.to_string(), "ApparentPower");
        assert_eq!(QuantityKind::None.as_str(), "None");
    }
}
