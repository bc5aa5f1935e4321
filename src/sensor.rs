//! Sensor board decoding pipeline
//!
//! - `frame`: discard-then-accept frame reader over a timed line source
//! - `normalize`: noise-floor cleaning of single tokens
//! - `snapshot`: per-channel readings and the emitted snapshot shape

pub mod frame;
pub mod normalize;
pub mod snapshot;

pub use frame::{FrameReader, LineSource, RawFrame, TimedLines};
pub use normalize::Normalizer;
pub use snapshot::{SensorReading, Snapshot, SnapshotRecord};

use crate::channels::ChannelLayout;
use crate::error::Result;

/// Read one frame from `source` and turn it into a snapshot.
///
/// The source is closed on every path, including timeouts and rejected
/// frames. A failed read never yields a partial snapshot.
pub async fn capture_snapshot<S>(
    source: &mut S,
    reader: &FrameReader,
    layout: Option<&ChannelLayout>,
    normalizer: &Normalizer,
) -> Result<Snapshot>
where
    S: LineSource + ?Sized,
{
    let frame = reader.read_frame(source).await;
    let closed = source.close().await;
    let snapshot = Snapshot::build(&frame?, layout, normalizer)?;
    closed?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::QuantityKind;
    use std::time::Duration;

    #[tokio::test]
    async fn capture_closes_source_after_success() {
        let mut src = TimedLines::new(&b"boot\n120,5,99\n"[..], Duration::from_secs(1));
        let layout = ChannelLayout::parse("addchannel 0 1\naddchannel 1 2\naddchannel 2 3\n");
        let snap = capture_snapshot(
            &mut src,
            &FrameReader::new(),
            Some(&layout),
            &Normalizer::default(),
        )
        .await
        .unwrap();
        assert!(!src.is_open());
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.readings()[2].kind, QuantityKind::Voltage);
    }

    #[tokio::test]
    async fn capture_closes_source_after_decode_failure() {
        let mut src = TimedLines::new(&b"boot\nERR board\n"[..], Duration::from_secs(1));
        let err = capture_snapshot(&mut src, &FrameReader::new(), None, &Normalizer::default())
            .await
            .unwrap_err();
        assert!(err.is_decode());
        assert!(!src.is_open());
    }

    #[tokio::test]
    async fn capture_closes_source_after_timeout() {
        let (_writer, reader) = tokio::io::duplex(16);
        let mut src = TimedLines::new(
            tokio::io::BufReader::new(reader),
            Duration::from_millis(20),
        );
        let err = capture_snapshot(&mut src, &FrameReader::new(), None, &Normalizer::default())
            .await
            .unwrap_err();
        assert!(matches!(err, crate::error::PowerPiError::Timeout { .. }));
        assert!(!src.is_open());
    }
}
