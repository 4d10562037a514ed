//! Configuration for thermo-sentineld

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use thermo_sentinel_core::{BaselineConfig, StoreConfig, DEFAULT_QUEUE_CAPACITY};

/// Main daemon configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Baseline window and policy
    #[serde(default)]
    pub baseline: BaselineConfig,

    /// Anomaly file
    #[serde(default)]
    pub store: StoreConfig,

    /// Ingest queue
    #[serde(default)]
    pub ingest: IngestConfig,

    /// Where readings come from
    #[serde(default)]
    pub source: SourceConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Ingest configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Readings buffered between the listener and the worker
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
        }
    }
}

/// Reading source configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    /// Newline-delimited JSON payloads on standard input
    Stdin,

    /// Newline-delimited JSON payloads over TCP, one connection at a time
    Tcp {
        /// Listen address
        listen_addr: SocketAddr,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Stdin
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// Default value helpers
fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_log_level() -> String {
    "info".to_string()
}

impl DaemonConfig {
    /// Load configuration: defaults, then the optional file, then `THERMO_*`
    /// environment variables (`THERMO_BASELINE__POLICY=sliding`).
    pub fn load(path: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder();

        // Add default configuration
        builder = builder.add_source(config::Config::try_from(&DaemonConfig::default())?);

        // Add file configuration if provided
        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("THERMO")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
