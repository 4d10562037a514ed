//! Temperature readings and the wall-clock timestamp format they carry.

use chrono::{Local, NaiveDateTime, SubsecRound};
use serde::{Deserialize, Serialize};

/// Timestamp layout used on the wire, in the anomaly file and on the feed.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single temperature measurement.
///
/// Immutable once created. `observed_at` is local wall-clock time truncated
/// to whole seconds so it survives a round-trip through [`TIMESTAMP_FORMAT`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: f64,
    #[serde(with = "timestamp")]
    pub observed_at: NaiveDateTime,
}

impl Reading {
    pub fn new(value: f64, observed_at: NaiveDateTime) -> Self {
        Self {
            value,
            observed_at: observed_at.trunc_subsecs(0),
        }
    }

    /// Stamp a value with the current local time.
    pub fn now(value: f64) -> Self {
        Self::new(value, Local::now().naive_local())
    }

    /// `observed_at` rendered as `YYYY-MM-DD HH:MM:SS`.
    pub fn timestamp(&self) -> String {
        self.observed_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

/// Serde adapter for `NaiveDateTime` in [`TIMESTAMP_FORMAT`].
pub mod timestamp {
    use chrono::NaiveDateTime;
    use serde::{de, Deserialize, Deserializer, Serializer};

    use super::TIMESTAMP_FORMAT;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(&ts.format(TIMESTAMP_FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(de::Error::custom)
    }
}
