//! Error kinds for each failure path of the dashboard.
//!
//! None of these are fatal. Callers either surface them as a notice or log
//! them and keep the previous state.

/// A forecast, air-quality or comparison request that did not produce data.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Rejections from the comparison set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ComparisonError {
    #[error("You can only compare up to {max} cities at once.")]
    Full { max: usize },
    #[error("{0} is already being compared.")]
    Duplicate(String),
    #[error("No comparison city at position {index} (have {len}).")]
    OutOfRange { index: usize, len: usize },
}

/// Favorites persistence failures.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize stored value: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Failures while producing or writing an export payload.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to write export: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}
