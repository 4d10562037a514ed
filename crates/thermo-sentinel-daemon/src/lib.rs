//! thermo-sentinel daemon library
//!
//! This module provides the pieces the `thermo-sentineld` binary wires up:
//! - Layered configuration
//! - Reading sources (stdin, TCP)
//! - Console presenter for the status feed
//! - Server lifecycle and graceful shutdown

pub mod config;
pub mod error;
pub mod presenter;
pub mod server;
pub mod source;

pub use crate::config::{DaemonConfig, IngestConfig, LoggingConfig, SourceConfig};
pub use crate::error::{DaemonError, DaemonResult};
pub use crate::presenter::Presenter;
pub use crate::server::{shutdown_signal, Server};
pub use crate::source::{open_source, TcpSource};
