//! Ingest service: the single serialization point for the pipeline.
//!
//! Readings are decoded on the listener side in arrival order and pushed
//! into a bounded queue. Exactly one worker task owns the [`Pipeline`] and
//! drains the queue, so readings are processed strictly in order and the
//! pipeline is never re-entered.

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{IngestError, IngestResult};
use crate::feed::FeedSubscriber;
use crate::pipeline::{Pipeline, PipelineStats};
use crate::reading::Reading;
use crate::source::{decode_payload, ReadingSource};

/// Default bound on readings waiting for the worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 64;

/// Bytes of a rejected payload echoed into the log.
const PAYLOAD_LOG_LIMIT: usize = 128;

/// Spawns the ingest worker.
pub struct IngestService;

impl IngestService {
    /// Move the pipeline onto its own worker task.
    ///
    /// Returns a handle for submitting readings and stopping the worker.
    pub fn spawn(pipeline: Pipeline, queue_capacity: usize) -> IngestHandle {
        let feed = pipeline.subscribe();
        let (tx, rx) = mpsc::channel::<Reading>(queue_capacity.max(1));
        let (stop_tx, stop_rx) = mpsc::channel::<()>(1);

        let task = tokio::spawn(run_worker(pipeline, rx, stop_rx));

        IngestHandle {
            readings: tx,
            stop: stop_tx,
            task,
            feed,
        }
    }
}

async fn run_worker(
    mut pipeline: Pipeline,
    mut rx: mpsc::Receiver<Reading>,
    mut stop_rx: mpsc::Receiver<()>,
) -> PipelineStats {
    loop {
        tokio::select! {
            biased;
            _ = stop_rx.recv() => {
                debug!("ingest worker stop requested");
                break;
            }
            reading = rx.recv() => {
                match reading {
                    Some(reading) => {
                        pipeline.process(reading);
                    }
                    None => {
                        debug!("ingest queue closed");
                        return pipeline.stats();
                    }
                }
            }
        }
    }

    // Refuse new readings, then finish what was already accepted.
    rx.close();
    while let Some(reading) = rx.recv().await {
        pipeline.process(reading);
    }

    let stats = pipeline.stats();
    info!(
        processed = stats.processed,
        anomalies = stats.anomalies,
        persist_failures = stats.persist_failures,
        "ingest worker stopped"
    );
    stats
}

/// Lossy, length-capped rendering of a payload for log lines.
fn payload_preview(payload: &[u8]) -> String {
    if payload.len() <= PAYLOAD_LOG_LIMIT {
        return String::from_utf8_lossy(payload).into_owned();
    }
    format!(
        "{}... ({} more bytes)",
        String::from_utf8_lossy(&payload[..PAYLOAD_LOG_LIMIT]),
        payload.len() - PAYLOAD_LOG_LIMIT
    )
}

/// Handle to a running ingest worker.
pub struct IngestHandle {
    readings: mpsc::Sender<Reading>,
    stop: mpsc::Sender<()>,
    task: JoinHandle<PipelineStats>,
    feed: FeedSubscriber,
}

impl IngestHandle {
    /// Queue a reading, waiting if the queue is full.
    pub async fn submit(&self, reading: Reading) -> IngestResult<()> {
        self.readings
            .send(reading)
            .await
            .map_err(|_| IngestError::QueueClosed)
    }

    /// Decode a payload and queue the resulting reading.
    ///
    /// Undecodable payloads are logged and returned as an error; they never
    /// reach the window.
    pub async fn submit_payload(&self, payload: &[u8]) -> IngestResult<()> {
        let reading = decode_payload(payload).map_err(|e| {
            warn!(
                error = %e,
                len = payload.len(),
                payload = %payload_preview(payload),
                "dropping payload"
            );
            e
        })?;
        self.submit(reading).await
    }

    /// Pump a source into the queue until it is exhausted.
    ///
    /// Decode errors are skipped; a source I/O error ends the pump. Returns
    /// the number of readings queued.
    pub async fn pump<S: ReadingSource + ?Sized>(&self, source: &mut S) -> IngestResult<u64> {
        let mut queued = 0u64;
        loop {
            let payload = match source.next_payload().await {
                Ok(Some(payload)) => payload,
                Ok(None) => {
                    debug!(source = %source.describe(), "source exhausted");
                    return Ok(queued);
                }
                Err(e) => {
                    warn!(source = %source.describe(), error = %e, "source read failed");
                    return Ok(queued);
                }
            };
            match self.submit_payload(&payload).await {
                Ok(()) => queued += 1,
                Err(IngestError::Decode(_)) => continue,
                Err(e) => return Err(e),
            }
        }
    }

    /// A new subscriber to the presentation feed.
    pub fn subscribe(&self) -> FeedSubscriber {
        self.feed.clone()
    }

    /// Whether the worker is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop the worker after the reading in flight and everything already
    /// queued, and return the final counters.
    pub async fn shutdown(self) -> IngestResult<PipelineStats> {
        // The worker may already have exited if the queue closed.
        let _ = self.stop.send(()).await;
        drop(self.readings);
        Ok(self.task.await?)
    }
}
