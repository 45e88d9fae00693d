//! Error types
//!
//! Recorder and replayer never fail: they report reason codes instead.
//! Everything here belongs to one-shot actions (import, export, storage,
//! preferences) or to the video transport boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Malformed or out-of-contract document on import
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Document is not valid JSON: {message}")]
    InvalidJson { message: String },
    #[error("Document must be a JSON object.")]
    NotAnObject,
    #[error("Missing required field '{field}'.")]
    MissingField { field: &'static str },
    #[error("Field '{field}' must be a string.")]
    NotAString { field: &'static str },
    #[error("Judge name has {len} characters, limit is {limit}.")]
    JudgeNameTooLong { len: usize, limit: usize },
    #[error("Field 'entries' must be an array.")]
    EntriesNotArray,
    #[error("Entry {index} must be a [time, delta] pair of numbers.")]
    MalformedEntry { index: usize },
    #[error("Entry {index} has a negative time ({time}).")]
    NegativeTime { index: usize, time: f64 },
    #[error("Entry {index} has a time that is not a finite number.")]
    NonFiniteTime { index: usize },
    #[error("Entry {index} has a non-integer delta ({delta}).")]
    NonIntegralDelta { index: usize, delta: f64 },
    #[error("Entry {index} delta {delta} is outside +/-{limit}.")]
    DeltaOutOfRange { index: usize, delta: f64, limit: i64 },
    #[error("Entry {index} time {time} does not come after {previous}.")]
    TimesNotIncreasing { index: usize, previous: f64, time: f64 },
}

/// Video transport misbehaviour; callers degrade to no-op
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransportError {
    #[error("Video transport is not ready.")]
    NotReady,
    #[error("Video transport failed: {0}")]
    Failed(String),
}

/// Remote store I/O
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage error at '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Stored document is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Share server request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Share server answered with status {status}.")]
    Status { status: u16 },
}

/// Import/export failures surfaced to the user
#[derive(Debug, Error)]
pub enum TransferError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Unable to find score (ID: {hash})")]
    NotFound { hash: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Failed to access '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Preferences file problems
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to access preferences '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid preferences '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
