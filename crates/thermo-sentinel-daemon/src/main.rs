//! thermo-sentineld - temperature anomaly monitor
//!
//! Reads `{"temperatura": <value>}` payloads, classifies each reading against
//! a mean ± 3σ control band and appends anomalies to a JSON file.

use anyhow::Context;
use clap::Parser;
use thermo_sentinel_core::{BaselinePolicy, StoreFormat};
use thermo_sentinel_daemon::{DaemonConfig, Server, SourceConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// thermo-sentinel daemon CLI
#[derive(Parser)]
#[command(name = "thermo-sentineld")]
#[command(about = "Temperature anomaly monitor", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "THERMO_CONFIG")]
    config: Option<String>,

    /// Read payloads over TCP on this address instead of stdin
    #[arg(short, long, env = "THERMO_LISTEN_ADDR")]
    listen: Option<String>,

    /// Baseline policy: freeze or sliding
    #[arg(long, env = "THERMO_POLICY")]
    policy: Option<BaselinePolicy>,

    /// Anomaly file path
    #[arg(long, env = "THERMO_STORE_PATH")]
    store_path: Option<String>,

    /// Rewrite the anomaly file as a JSON array instead of appending lines
    #[arg(long)]
    json_array: bool,

    /// Log level
    #[arg(long, env = "THERMO_LOG_LEVEL")]
    log_level: Option<String>,

    /// Enable JSON logging
    #[arg(long, env = "THERMO_LOG_JSON")]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config =
        DaemonConfig::load(cli.config.as_deref()).context("failed to load configuration")?;

    // Override with CLI args
    if let Some(listen) = &cli.listen {
        config.source = SourceConfig::Tcp {
            listen_addr: listen
                .parse()
                .with_context(|| format!("invalid listen address: {}", listen))?,
        };
    }
    if let Some(policy) = cli.policy {
        config.baseline.policy = policy;
    }
    if let Some(path) = &cli.store_path {
        config.store.path = path.into();
    }
    if cli.json_array {
        config.store.format = StoreFormat::JsonArray;
    }
    if let Some(level) = &cli.log_level {
        config.logging.level = level.clone();
    }
    config.logging.json |= cli.json;

    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.level.clone().into());

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    let stats = Server::new(config).run().await?;
    tracing::info!(
        processed = stats.processed,
        anomalies = stats.anomalies,
        "done"
    );
    Ok(())
}
