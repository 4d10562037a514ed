//! # thermo-sentinel-core
//!
//! Control-band anomaly detection for a stream of temperature readings.
//!
//! Each reading is pushed into a bounded window, a baseline (mean ± 3σ) is
//! derived from it, the reading is classified against that band, anomalies
//! are persisted, and an update is published for whoever is displaying the
//! stream.
//!
//! ## Architecture
//!
//! ```text
//!   ReadingSource ──► decode_payload ──► IngestHandle (bounded queue)
//!                                              │
//!                                              ▼  single worker
//!                                     ┌──────────────────┐
//!                                     │  Pipeline        │
//!                                     │  ┌────────────┐  │
//!                                     │  │ Window     │  │  ← last N readings
//!                                     │  └────────────┘  │
//!                                     │  ┌────────────┐  │
//!                                     │  │ Estimator  │  │  ← freeze | sliding
//!                                     │  └────────────┘  │
//!                                     │  ┌────────────┐  │
//!                                     │  │ classify   │  │
//!                                     │  └────────────┘  │
//!                                     └───┬─────────┬────┘
//!                                         │         │
//!                                         ▼         ▼
//!                                  AnomalyStore   FeedPublisher ──► FeedSubscriber
//! ```
//!
//! ## Guarantees
//!
//! - Readings are processed strictly in arrival order, one at a time.
//! - Only the ingest worker mutates the window, baseline and store.
//! - Decode and persistence failures are logged and never stop ingestion.
//!
//! ## Quick Start
//!
//! ```rust
//! use thermo_sentinel_core::{
//!     BaselineConfig, InMemoryStore, Pipeline, Reading, Verdict,
//! };
//!
//! let (mut pipeline, feed) =
//!     Pipeline::new(BaselineConfig::default(), Box::new(InMemoryStore::new()));
//!
//! for v in [20.0, 21.0, 20.0, 22.0, 21.0, 20.0, 21.0, 22.0, 20.0, 21.0] {
//!     pipeline.process(Reading::now(v));
//! }
//!
//! let update = pipeline.process(Reading::now(30.0));
//! assert_eq!(update.verdict, Verdict::AnomalyHigh);
//! assert_eq!(feed.latest().unwrap().seq, 11);
//! ```

#![deny(unsafe_code)]

pub mod baseline;
pub mod classifier;
pub mod error;
pub mod feed;
pub mod ingest;
pub mod pipeline;
pub mod reading;
pub mod source;
pub mod store;
pub mod window;

// ── Re-exports ──────────────────────────────────────────────────────────

pub use baseline::{
    population_stats, Baseline, BaselineConfig, BaselineEstimator, BaselinePolicy, ControlBand,
    DEFAULT_SIGMA_MULTIPLIER,
};
pub use classifier::{classify, AnomalyKind, Verdict};
pub use error::{
    DecodeError, DecodeResult, IngestError, IngestResult, StoreError, StoreResult,
};
pub use feed::{ChartHistory, ChartPoint, FeedPublisher, FeedSubscriber, FeedUpdate, IDLE_STATUS_LABEL};
pub use ingest::{IngestHandle, IngestService, DEFAULT_QUEUE_CAPACITY};
pub use pipeline::{Pipeline, PipelineStats};
pub use reading::{Reading, TIMESTAMP_FORMAT};
pub use source::{decode_payload, decode_value, LineSource, ReadingSource, TEMPERATURE_FIELD};
pub use store::{
    AnomalyRecord, AnomalyStore, InMemoryStore, JsonArrayStore, JsonLinesStore, StoreConfig,
    StoreFormat, DEFAULT_STORE_PATH,
};
pub use window::{BaselineWindow, DEFAULT_WINDOW_CAPACITY};
