use crate::channels::{ChannelLayout, QuantityKind};
use crate::error::Result;
use crate::sensor::frame::RawFrame;
use crate::sensor::normalize::Normalizer;
use serde::{Deserialize, Serialize};

/// One classified, cleaned channel value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Zero-based channel index within the frame
    pub index: usize,
    pub kind: QuantityKind,
    pub value: f64,
}

impl SensorReading {
    /// One-based identifier used in emitted records
    pub fn sensor_id(&self) -> usize {
        self.index + 1
    }
}

/// All readings decoded from a single frame, in channel order
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Snapshot {
    readings: Vec<SensorReading>,
}

impl Snapshot {
    /// Normalize and classify every token of `frame`.
    ///
    /// Without a layout every channel is `Unknown`. The result has exactly
    /// one reading per token, in token order.
    pub fn build(
        frame: &RawFrame,
        layout: Option<&ChannelLayout>,
        normalizer: &Normalizer,
    ) -> Result<Self> {
        let readings = frame
            .tokens()
            .iter()
            .enumerate()
            .map(|(index, token)| -> Result<SensorReading> {
                Ok(SensorReading {
                    index,
                    kind: layout.map_or(QuantityKind::Unknown, |l| l.kind(index)),
                    value: normalizer.normalize(token)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { readings })
    }

    pub fn readings(&self) -> &[SensorReading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Value of channel `index`, if present
    pub fn value(&self, index: usize) -> Option<f64> {
        self.readings.get(index).map(|r| r.value)
    }

    /// Last reading of the frame (the board's trailing voltage channel)
    pub fn last(&self) -> Option<&SensorReading> {
        self.readings.last()
    }

    /// Discovery-style record handed to the output sink
    pub fn to_record(&self) -> SnapshotRecord {
        SnapshotRecord {
            data: self.readings.iter().map(SnapshotEntry::from).collect(),
        }
    }
}

/// Emitted snapshot shape: `{"data": [...]}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotRecord {
    pub data: Vec<SnapshotEntry>,
}

/// One emitted channel entry; all values are strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    #[serde(rename = "{#SENSOR_ID}")]
    pub sensor_id: String,
    #[serde(rename = "{#SENSOR_TYPE}")]
    pub sensor_type: String,
    #[serde(rename = "{#SENSOR_VALUE}")]
    pub sensor_value: String,
}

impl From<&SensorReading> for SnapshotEntry {
    fn from(reading: &SensorReading) -> Self {
        Self {
            sensor_id: reading.sensor_id().to_string(),
            sensor_type: reading.kind.to_string(),
            sensor_value: format_value(reading.value),
        }
    }
}

/// Render a value with at least one fractional digit (`150.0`, not `150`)
pub fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sensor::frame::decode_line;

    #[test]
    fn build_without_layout_is_unknown() {
        let frame = decode_line("5.0,95.0,150.0").unwrap();
        let snap = Snapshot::build(&frame, None, &Normalizer::default()).unwrap();
        assert_eq!(snap.len(), 3);
        let values: Vec<f64> = snap.readings().iter().map(|r| r.value).collect();
        assert_eq!(values, vec![0.0, 0.0, 150.0]);
        assert!(snap.readings().iter().all(|r| r.kind == QuantityKind::Unknown));
        assert_eq!(
            snap.readings().iter().map(|r| r.index).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn build_with_layout_classifies_by_index() {
        let layout = ChannelLayout::parse("addchannel 0 1\naddchannel 1 3\n");
        let frame = decode_line("250,231.5,300").unwrap();
        let snap = Snapshot::build(&frame, Some(&layout), &Normalizer::default()).unwrap();
        assert_eq!(snap.readings()[0].kind, QuantityKind::RealPower);
        assert_eq!(snap.readings()[1].kind, QuantityKind::Voltage);
        assert_eq!(snap.readings()[2].kind, QuantityKind::Unknown);
        assert_eq!(snap.last().map(|r| r.value), Some(300.0));
        assert_eq!(snap.value(1), Some(231.5));
        assert_eq!(snap.value(3), None);
    }

    #[test]
    fn record_uses_discovery_keys() {
        let layout = ChannelLayout::parse("addchannel 0 4\n");
        let frame = decode_line("150,12\r").unwrap();
        let snap = Snapshot::build(&frame, Some(&layout), &Normalizer::default()).unwrap();
        let json = serde_json::to_value(snap.to_record()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "data": [
                    {"{#SENSOR_ID}": "1", "{#SENSOR_TYPE}": "Current", "{#SENSOR_VALUE}": "150.0"},
                    {"{#SENSOR_ID}": "2", "{#SENSOR_TYPE}": "Unknown", "{#SENSOR_VALUE}": "0.0"}
                ]
            })
        );
    }

    #[test]
    fn format_keeps_fraction() {
        assert_eq!(format_value(150.0), "150.0");
        assert_eq!(format_value(0.0), "0.0");
        assert_eq!(format_value(231.25), "231.25");
    }
}
