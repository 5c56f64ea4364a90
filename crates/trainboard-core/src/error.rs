//! Error types for trainboard-core.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrainboardError {
    #[cfg(not(target_arch = "wasm32"))]
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The stored record under `inputs` could not be decoded.
    #[error("Stored record is corrupt: {0}")]
    CorruptState(String),

    #[error("Storage unavailable: {0}")]
    Storage(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unknown dataset: {0}")]
    UnknownDataset(String),

    #[error("Unknown model type: {0}")]
    UnknownModel(String),

    #[error("Task not found: {0}")]
    TaskNotFound(u64),

    #[error("Document not found: {0}")]
    DocumentNotFound(String),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, TrainboardError>;
