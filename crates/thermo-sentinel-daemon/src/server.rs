//! Daemon lifecycle: wire source → ingest worker → presenter, run until the
//! source ends or a shutdown signal arrives.

use thermo_sentinel_core::{IngestService, Pipeline, PipelineStats, ReadingSource};
use tokio::task::JoinHandle;

use crate::config::DaemonConfig;
use crate::error::{DaemonError, DaemonResult};
use crate::presenter::Presenter;
use crate::source::open_source;

/// thermo-sentinel daemon
pub struct Server {
    config: DaemonConfig,
}

impl Server {
    pub fn new(config: DaemonConfig) -> Self {
        Self { config }
    }

    /// Run with the configured source until it is exhausted or the process
    /// is asked to stop.
    pub async fn run(self) -> DaemonResult<PipelineStats> {
        let mut source = open_source(&self.config.source).await?;
        self.run_with_source(source.as_mut(), shutdown_signal())
            .await
    }

    /// Run against an explicit source and shutdown future.
    pub async fn run_with_source<S, F>(&self, source: &mut S, shutdown: F) -> DaemonResult<PipelineStats>
    where
        S: ReadingSource + ?Sized,
        F: std::future::Future<Output = ()>,
    {
        tracing::info!(
            policy = %self.config.baseline.policy,
            window = self.config.baseline.window_capacity,
            sigma = self.config.baseline.sigma_multiplier,
            store = %self.config.store.path.display(),
            source = %source.describe(),
            "thermo-sentinel starting"
        );

        let (pipeline, feed) = Pipeline::new(self.config.baseline.clone(), self.config.store.open());
        let handle = IngestService::spawn(pipeline, self.config.ingest.queue_capacity);
        let presenter: JoinHandle<Presenter> =
            tokio::spawn(Presenter::new(self.config.baseline.window_capacity).run(feed));

        tokio::select! {
            pumped = handle.pump(source) => {
                let queued = pumped?;
                tracing::info!(queued, "reading source finished");
            }
            _ = shutdown => {}
        }

        let stats = handle.shutdown().await?;
        presenter
            .await
            .map_err(|e| DaemonError::Presenter(e.to_string()))?;

        tracing::info!(
            processed = stats.processed,
            anomalies = stats.anomalies,
            persist_failures = stats.persist_failures,
            "thermo-sentinel shutting down"
        );
        Ok(stats)
    }
}

/// Graceful shutdown signal handler
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received terminate signal, initiating graceful shutdown");
        }
    }
}
