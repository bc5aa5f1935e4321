//! One decode-classify-derive cycle
//!
//! A [`Pipeline`] is built once per run from the immutable [`Config`]. The
//! channel layout is resolved at construction and never changes afterwards.

use crate::channels::ChannelLayout;
use crate::config::Config;
use crate::error::Result;
use crate::logging::{StructuredLogger, get_logger};
use crate::metrics::{CircuitMetrics, MetricsCalculator};
use crate::sensor::{FrameReader, LineSource, Normalizer, Snapshot, capture_snapshot};
use crate::sink::OutputSink;
use crate::transport::open_serial;

/// Everything a run needs besides the transport and the sink
#[derive(Debug, Clone)]
pub struct Pipeline {
    reader: FrameReader,
    layout: Option<ChannelLayout>,
    normalizer: Normalizer,
    calculator: MetricsCalculator,
    logger: StructuredLogger,
}

impl Pipeline {
    /// Resolve the channel layout and check the metrics layout constants
    pub fn from_config(config: &Config) -> Result<Self> {
        let layout = config
            .channels
            .config_file
            .as_deref()
            .map(|path| ChannelLayout::load(Some(path)));

        Ok(Self {
            reader: FrameReader::with_retries(config.serial.decode_retries),
            layout,
            normalizer: Normalizer::new(config.channels.noise_floor),
            calculator: MetricsCalculator::new(config.metrics.clone())?,
            logger: get_logger("pipeline"),
        })
    }

    pub fn layout(&self) -> Option<&ChannelLayout> {
        self.layout.as_ref()
    }

    /// Read one frame from `source` and close it
    pub async fn capture<S>(&self, source: &mut S) -> Result<Snapshot>
    where
        S: LineSource + ?Sized,
    {
        let snapshot =
            capture_snapshot(source, &self.reader, self.layout.as_ref(), &self.normalizer).await?;
        self.logger
            .info(&format!("Captured snapshot with {} channels", snapshot.len()));
        Ok(snapshot)
    }

    /// Per-circuit metrics for a captured snapshot
    pub fn derive(&self, snapshot: &Snapshot) -> Result<Vec<CircuitMetrics>> {
        self.calculator.derive(snapshot)
    }

    /// Capture from `source` and emit the snapshot
    pub async fn snapshot_to<S>(&self, source: &mut S, sink: &mut dyn OutputSink) -> Result<Snapshot>
    where
        S: LineSource + ?Sized,
    {
        let snapshot = self.capture(source).await?;
        sink.emit_snapshot(&snapshot).await?;
        Ok(snapshot)
    }

    /// Capture from `source`, derive metrics and emit them
    pub async fn publish_to<S>(
        &self,
        source: &mut S,
        sink: &mut dyn OutputSink,
    ) -> Result<Vec<CircuitMetrics>>
    where
        S: LineSource + ?Sized,
    {
        let snapshot = self.capture(source).await?;
        let metrics = self.derive(&snapshot)?;
        sink.emit_metrics(&metrics).await?;
        Ok(metrics)
    }
}

/// Open the configured serial port and emit one snapshot
pub async fn run_snapshot(config: &Config, sink: &mut dyn OutputSink) -> Result<Snapshot> {
    let pipeline = Pipeline::from_config(config)?;
    let mut source = open_serial(&config.serial)?;
    pipeline.snapshot_to(&mut source, sink).await
}

/// Open the configured serial port and publish one set of circuit metrics
pub async fn run_publish(
    config: &Config,
    sink: &mut dyn OutputSink,
) -> Result<Vec<CircuitMetrics>> {
    let pipeline = Pipeline::from_config(config)?;
    let mut source = open_serial(&config.serial)?;
    pipeline.publish_to(&mut source, sink).await
}
