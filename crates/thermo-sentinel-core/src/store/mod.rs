//! Durable anomaly storage.
//!
//! Provides the `AnomalyStore` trait plus two file-backed shapes
//! (`JsonLinesStore`, append-only; `JsonArrayStore`, rewritten array) and an
//! in-memory store for tests. None of the stores coordinate between
//! processes: callers funnel every `record` through a single writer.

pub mod file;

use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::classifier::AnomalyKind;
use crate::error::{StoreError, StoreResult};
use crate::reading::Reading;

pub use file::{JsonArrayStore, JsonLinesStore};

/// Default anomaly file, relative to the working directory.
pub const DEFAULT_STORE_PATH: &str = "anomalias_detectadas.json";

/// One persisted anomaly. Never mutated or deleted once recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnomalyRecord {
    #[serde(rename = "timestamp", with = "crate::reading::timestamp")]
    pub observed_at: NaiveDateTime,
    #[serde(rename = "temperatura")]
    pub value: f64,
    #[serde(rename = "tipo_anomalia")]
    pub kind: AnomalyKind,
}

impl AnomalyRecord {
    pub fn new(reading: &Reading, kind: AnomalyKind) -> Self {
        Self {
            observed_at: reading.observed_at,
            value: reading.value,
            kind,
        }
    }
}

/// Trait for anomaly persistence.
pub trait AnomalyStore: Send {
    /// Durably record one anomaly.
    fn record(&self, record: &AnomalyRecord) -> StoreResult<()>;

    /// Read back every recorded anomaly, oldest first.
    ///
    /// Returns an empty list if nothing has been stored yet.
    fn load(&self) -> StoreResult<Vec<AnomalyRecord>>;
}

impl<S: AnomalyStore + Sync + ?Sized> AnomalyStore for std::sync::Arc<S> {
    fn record(&self, record: &AnomalyRecord) -> StoreResult<()> {
        (**self).record(record)
    }

    fn load(&self) -> StoreResult<Vec<AnomalyRecord>> {
        (**self).load()
    }
}

impl<S: AnomalyStore + ?Sized> AnomalyStore for Box<S> {
    fn record(&self, record: &AnomalyRecord) -> StoreResult<()> {
        (**self).record(record)
    }

    fn load(&self) -> StoreResult<Vec<AnomalyRecord>> {
        (**self).load()
    }
}

// ── Configuration ───────────────────────────────────────────────────────

/// On-disk shape of the anomaly file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreFormat {
    /// One JSON object per line, appended.
    #[default]
    #[serde(alias = "jsonl")]
    JsonLines,
    /// A single JSON array rewritten on every record.
    JsonArray,
}

/// Anomaly store configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub format: StoreFormat,
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            format: StoreFormat::default(),
            path: default_store_path(),
        }
    }
}

impl StoreConfig {
    /// Build the configured store.
    pub fn open(&self) -> Box<dyn AnomalyStore> {
        match self.format {
            StoreFormat::JsonLines => Box::new(JsonLinesStore::new(&self.path)),
            StoreFormat::JsonArray => Box::new(JsonArrayStore::new(&self.path)),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_PATH)
}

// ── In-memory store ─────────────────────────────────────────────────────

/// In-memory anomaly store (for testing).
pub struct InMemoryStore {
    records: std::sync::Mutex<Vec<AnomalyRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            records: std::sync::Mutex::new(Vec::new()),
        }
    }

    /// Number of records stored.
    pub fn len(&self) -> usize {
        self.records.lock().map(|r| r.len()).unwrap_or(0)
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AnomalyStore for InMemoryStore {
    fn record(&self, record: &AnomalyRecord) -> StoreResult<()> {
        let mut records = self.records.lock().map_err(|_| StoreError::LockError)?;
        records.push(record.clone());
        Ok(())
    }

    fn load(&self) -> StoreResult<Vec<AnomalyRecord>> {
        let records = self.records.lock().map_err(|_| StoreError::LockError)?;
        Ok(records.clone())
    }
}
