//! File-backed anomaly stores.

use std::fs::OpenOptions;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::error::StoreResult;

use super::{AnomalyRecord, AnomalyStore};

/// Append-only store: one JSON object per line.
///
/// `record` never reads existing content. Safe for a single writer only.
pub struct JsonLinesStore {
    path: PathBuf,
}

impl JsonLinesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AnomalyStore for JsonLinesStore {
    fn record(&self, record: &AnomalyRecord) -> StoreResult<()> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        file.write_all(&line)?;
        file.sync_data()?;
        Ok(())
    }

    fn load(&self) -> StoreResult<Vec<AnomalyRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let reader = BufReader::new(std::fs::File::open(&self.path)?);
        let mut records = Vec::new();
        for (idx, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<AnomalyRecord>(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!(
                    path = %self.path.display(),
                    line = idx + 1,
                    error = %e,
                    "skipping corrupt anomaly line"
                ),
            }
        }
        Ok(records)
    }
}

/// Rewritten-array store: the file holds one JSON array.
///
/// Each `record` reads the array (absent or corrupt → empty), appends, and
/// rewrites the file atomically (write `.tmp`, then rename). The
/// read-modify-write cycle drops records under concurrent writers, so all
/// calls must come from one writer.
pub struct JsonArrayStore {
    path: PathBuf,
}

impl JsonArrayStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_existing(&self) -> StoreResult<Vec<AnomalyRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str(&contents) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(
                    path = %self.path.display(),
                    error = %e,
                    "anomaly array unreadable, starting a new one"
                );
                Ok(Vec::new())
            }
        }
    }
}

impl AnomalyStore for JsonArrayStore {
    fn record(&self, record: &AnomalyRecord) -> StoreResult<()> {
        let mut all = self.read_existing()?;
        all.push(record.clone());

        let json = serde_json::to_string_pretty(&all)?;
        let tmp_path = self.path.with_extension("tmp");
        let mut tmp = std::fs::File::create(&tmp_path)?;
        tmp.write_all(json.as_bytes())?;
        tmp.sync_data()?;
        std::fs::rename(&tmp_path, &self.path)?;
        Ok(())
    }

    fn load(&self) -> StoreResult<Vec<AnomalyRecord>> {
        self.read_existing()
    }
}
