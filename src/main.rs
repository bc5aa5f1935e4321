use anyhow::Result;
use clap::{Parser, Subcommand};
use powerpi::config::{Config, Overrides};
use powerpi::logging::init_logging;
use powerpi::pipeline::{run_publish, run_snapshot};
use powerpi::sink::{JsonSink, OutputSink};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "powerpi")]
#[command(about = "Read one snapshot from a sensor board and report power metrics")]
#[command(version = powerpi::VERSION)]
struct Cli {
    /// Serial port to use, e.g. /dev/ttyS0
    #[arg(short = 'p', long, global = true)]
    port: Option<String>,

    /// Serial port baud rate
    #[arg(short = 'b', long, global = true)]
    baud_rate: Option<u32>,

    /// Per-read timeout for the serial port in seconds
    #[arg(short = 't', long, global = true)]
    timeout: Option<u64>,

    /// Board configuration file used to classify each channel
    #[arg(short = 'c', long, global = true)]
    config_file: Option<PathBuf>,

    /// YAML settings file (defaults to powerpi.yaml or /etc/powerpi/config.yaml)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the decoded snapshot as JSON (default)
    Snapshot,

    /// Derive per-circuit metrics and send them to InfluxDB (or stdout)
    Publish {
        /// Print metrics as JSON instead of writing to InfluxDB
        #[arg(long)]
        stdout: bool,
    },
}

fn load_config(cli: &Cli) -> powerpi::Result<Config> {
    let mut config = Config::load(cli.settings.as_deref())?;
    config.apply_overrides(Overrides {
        port: cli.port.clone(),
        baud_rate: cli.baud_rate,
        timeout_secs: cli.timeout,
        channel_config: cli.config_file.clone(),
    });
    config.validate()?;
    Ok(config)
}

fn metrics_sink(config: &Config, force_stdout: bool) -> powerpi::Result<Box<dyn OutputSink>> {
    #[cfg(feature = "influxdb")]
    {
        if config.influxdb.enabled && !force_stdout {
            return Ok(Box::new(powerpi::sink::InfluxSink::new(&config.influxdb)?));
        }
    }
    #[cfg(not(feature = "influxdb"))]
    let _ = force_stdout;
    Ok(Box::new(JsonSink::stdout(&config.influxdb.measurement)))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli).map_err(|e| anyhow::anyhow!("Failed to load settings: {}", e))?;
    init_logging(&config.logging).map_err(|e| anyhow::anyhow!("Failed to init logging: {}", e))?;

    info!("PowerPi {} reading from {}", powerpi::VERSION, config.serial.port);

    let outcome = match cli.command.unwrap_or(Commands::Snapshot) {
        Commands::Snapshot => {
            let mut sink = JsonSink::stdout(&config.influxdb.measurement);
            run_snapshot(&config, &mut sink).await.map(|_| ())
        }
        Commands::Publish { stdout } => {
            let mut sink = metrics_sink(&config, stdout)?;
            run_publish(&config, sink.as_mut()).await.map(|_| ())
        }
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Run failed: {}", e);
            Err(anyhow::anyhow!("PowerPi error: {}", e))
        }
    }
}
