//! Reading sources and payload decoding.
//!
//! A source yields raw payloads; [`decode_payload`] turns one into a
//! [`Reading`] stamped with the local receive time. Transport concerns
//! (brokers, reconnects) live behind the [`ReadingSource`] trait.

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

use crate::error::{DecodeError, DecodeResult};
use crate::reading::Reading;

/// JSON key carrying the measurement.
pub const TEMPERATURE_FIELD: &str = "temperatura";

/// Decode a payload received now.
pub fn decode_payload(payload: &[u8]) -> DecodeResult<Reading> {
    Ok(Reading::now(decode_value(payload)?))
}

/// Extract the temperature from a JSON object payload.
///
/// A missing field yields `0.0`. That silently feeds a 0°C reading into the
/// baseline; kept for compatibility with existing publishers. Numeric
/// strings are accepted.
pub fn decode_value(payload: &[u8]) -> DecodeResult<f64> {
    let text = std::str::from_utf8(payload)?;
    let json: Value = serde_json::from_str(text.trim())?;

    let object = match &json {
        Value::Object(map) => map,
        other => return Err(DecodeError::NotAnObject(json_kind(other))),
    };

    let value = match object.get(TEMPERATURE_FIELD) {
        None => {
            debug!(field = TEMPERATURE_FIELD, "field absent, defaulting to 0");
            0.0
        }
        Some(Value::Number(n)) => n.as_f64().ok_or_else(|| invalid(&n.to_string()))?,
        Some(Value::String(s)) => s.trim().parse::<f64>().map_err(|_| invalid(s))?,
        Some(other) => return Err(invalid(&other.to_string())),
    };

    if !value.is_finite() {
        return Err(invalid(&value.to_string()));
    }
    Ok(value)
}

fn invalid(found: &str) -> DecodeError {
    DecodeError::InvalidTemperature {
        field: TEMPERATURE_FIELD,
        found: found.to_string(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Anything that delivers raw reading payloads, one per measurement.
#[async_trait]
pub trait ReadingSource: Send {
    /// Wait for the next payload. `Ok(None)` means the source is exhausted.
    async fn next_payload(&mut self) -> std::io::Result<Option<Vec<u8>>>;

    /// Name for logs.
    fn describe(&self) -> String;
}

/// Newline-delimited payloads from any async reader.
///
/// Lines are returned as raw bytes; validating the encoding is the
/// decoder's job, so a garbled line never ends the stream.
pub struct LineSource<R> {
    reader: R,
    name: String,
    line: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin + Send> LineSource<R> {
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: name.into(),
            line: Vec::new(),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> ReadingSource for LineSource<R> {
    async fn next_payload(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        loop {
            self.line.clear();
            if self.reader.read_until(b'\n', &mut self.line).await? == 0 {
                return Ok(None);
            }
            let trimmed = self.line.trim_ascii();
            if !trimmed.is_empty() {
                return Ok(Some(trimmed.to_vec()));
            }
        }
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}
