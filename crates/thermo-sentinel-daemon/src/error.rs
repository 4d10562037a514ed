//! Daemon error types

use thermo_sentinel_core::IngestError;
use thiserror::Error;

/// Daemon error types
#[derive(Debug, Error)]
pub enum DaemonError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Ingest worker error
    #[error("Ingest error: {0}")]
    Ingest(#[from] IngestError),

    /// Presenter task error
    #[error("Presenter error: {0}")]
    Presenter(String),
}

impl From<config::ConfigError> for DaemonError {
    fn from(e: config::ConfigError) -> Self {
        DaemonError::Config(e.to_string())
    }
}

/// Result type for daemon operations
pub type DaemonResult<T> = Result<T, DaemonError>;
