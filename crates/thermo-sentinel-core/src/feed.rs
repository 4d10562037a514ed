//! Presentation feed: the latest per-reading update, for a decoupled reader.
//!
//! The ingest worker is the only publisher. Readers hold a [`FeedSubscriber`]
//! and only ever see the most recent update; they cannot reach the window,
//! baseline or store.

use std::collections::VecDeque;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::baseline::ControlBand;
use crate::classifier::Verdict;

/// Label time format used on the chart axis.
pub const CHART_TIME_FORMAT: &str = "%H:%M:%S";

/// One update per processed reading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeedUpdate {
    /// Position of the reading in processing order, starting at 1.
    pub seq: u64,
    pub value: f64,
    #[serde(with = "crate::reading::timestamp")]
    pub observed_at: NaiveDateTime,
    pub verdict: Verdict,
    /// Absent while the verdict is `Insufficient`.
    pub band: Option<ControlBand>,
    pub window_len: usize,
    pub window_capacity: usize,
}

impl FeedUpdate {
    /// `Temperatura: <value>°C`
    pub fn temperature_label(&self) -> String {
        format!("Temperatura: {}°C", self.value)
    }

    /// `Estado: ...` text for the verdict, with the crossed limit on anomalies.
    pub fn status_label(&self) -> String {
        match (self.verdict, self.band) {
            (Verdict::Insufficient, _) => format!(
                "Estado: Esperando línea base ({}/{})",
                self.window_len, self.window_capacity
            ),
            (Verdict::Normal, _) => "Estado: Temperatura normal".to_string(),
            (Verdict::AnomalyHigh, Some(band)) => format!(
                "Estado: Anomalía - Temperatura alta (UCL {:.2}°C)",
                band.upper
            ),
            (Verdict::AnomalyLow, Some(band)) => format!(
                "Estado: Anomalía - Temperatura baja (LCL {:.2}°C)",
                band.lower
            ),
            (Verdict::AnomalyHigh, None) => "Estado: Anomalía - Temperatura alta".to_string(),
            (Verdict::AnomalyLow, None) => "Estado: Anomalía - Temperatura baja".to_string(),
        }
    }
}

/// Status shown before the first reading arrives.
pub const IDLE_STATUS_LABEL: &str = "Estado: Esperando datos...";

/// Write side of the feed. Owned by the ingest worker.
pub struct FeedPublisher {
    tx: watch::Sender<Option<FeedUpdate>>,
}

impl FeedPublisher {
    /// Create a publisher and its first subscriber.
    pub fn channel() -> (Self, FeedSubscriber) {
        let (tx, rx) = watch::channel(None);
        (Self { tx }, FeedSubscriber { rx })
    }

    /// Replace the latest update. Succeeds even with no subscribers.
    pub fn publish(&self, update: FeedUpdate) {
        self.tx.send_replace(Some(update));
    }

    /// Another reader of this feed.
    pub fn subscribe(&self) -> FeedSubscriber {
        FeedSubscriber {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read side of the feed.
#[derive(Clone)]
pub struct FeedSubscriber {
    rx: watch::Receiver<Option<FeedUpdate>>,
}

impl FeedSubscriber {
    /// The most recent update, if any reading has been processed.
    pub fn latest(&self) -> Option<FeedUpdate> {
        self.rx.borrow().clone()
    }

    /// Wait for the next update. Returns `None` once the publisher is gone.
    ///
    /// Updates published while the reader was busy are coalesced: only the
    /// newest is returned.
    pub async fn next(&mut self) -> Option<FeedUpdate> {
        loop {
            self.rx.changed().await.ok()?;
            if let Some(update) = self.rx.borrow_and_update().clone() {
                return Some(update);
            }
        }
    }
}

// ── Chart History ───────────────────────────────────────────────────────

/// A plotted point.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartPoint {
    /// `HH:MM:SS` axis label.
    pub label: String,
    pub value: f64,
}

/// Reader-side history for a control chart: the last N points plus the
/// latest band. Owned entirely by the presentation context.
#[derive(Clone, Debug)]
pub struct ChartHistory {
    points: VecDeque<ChartPoint>,
    capacity: usize,
    band: Option<ControlBand>,
    last_seq: u64,
}

impl ChartHistory {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            points: VecDeque::with_capacity(capacity),
            capacity,
            band: None,
            last_seq: 0,
        }
    }

    /// Append a point for the update. Stale or repeated updates are ignored.
    pub fn apply(&mut self, update: &FeedUpdate) -> bool {
        if update.seq <= self.last_seq {
            return false;
        }
        self.last_seq = update.seq;
        if self.points.len() == self.capacity {
            self.points.pop_front();
        }
        self.points.push_back(ChartPoint {
            label: update.observed_at.format(CHART_TIME_FORMAT).to_string(),
            value: update.value,
        });
        self.band = update.band;
        true
    }

    /// Plotted points, oldest first.
    pub fn points(&self) -> impl Iterator<Item = &ChartPoint> {
        self.points.iter()
    }

    /// Number of points held.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether no update has been applied yet.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Upper/lower control limits to draw, if a band is known.
    pub fn band(&self) -> Option<ControlBand> {
        self.band
    }
}
