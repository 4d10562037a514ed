use thiserror::Error;

/// Errors turning a raw payload into a reading.
///
/// Never fatal: the payload is logged and dropped and does not count
/// toward the baseline window.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid UTF-8: {0}")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("payload is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload is not a JSON object (found {0})")]
    NotAnObject(&'static str),

    #[error("field `{field}` is not a temperature: {found}")]
    InvalidTemperature { field: &'static str, found: String },
}

/// Errors from durable anomaly storage.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("anomaly store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("anomaly record serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("lock acquisition failed")]
    LockError,
}

/// Errors from the ingest service.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("ingest queue closed; worker is no longer accepting readings")]
    QueueClosed,

    #[error("ingest worker failed: {0}")]
    WorkerFailed(String),

    #[error("payload rejected: {0}")]
    Decode(#[from] DecodeError),
}

impl From<tokio::task::JoinError> for IngestError {
    fn from(e: tokio::task::JoinError) -> Self {
        IngestError::WorkerFailed(e.to_string())
    }
}

pub type DecodeResult<T> = Result<T, DecodeError>;

pub type StoreResult<T> = Result<T, StoreError>;

pub type IngestResult<T> = Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let e = DecodeError::NotAnObject("array");
        assert!(e.to_string().contains("array"));

        let e = DecodeError::InvalidTemperature {
            field: "temperatura",
            found: "\"caliente\"".into(),
        };
        assert!(e.to_string().contains("temperatura"));
        assert!(e.to_string().contains("caliente"));

        let e = IngestError::WorkerFailed("panicked".into());
        assert!(e.to_string().contains("panicked"));
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only fs");
        let store_err: StoreError = io_err.into();
        assert!(store_err.to_string().contains("read-only fs"));
    }

    #[test]
    fn json_error_converts_to_decode_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let e: DecodeError = json_err.into();
        assert!(matches!(e, DecodeError::InvalidJson(_)));

        let ingest: IngestError = e.into();
        assert!(ingest.to_string().starts_with("payload rejected"));
    }
}
