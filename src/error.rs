//! Error taxonomy. Only ingestion and artifact loading surface errors; every
//! scoring stage past extraction degrades to a deterministic fallback instead.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoringError {
    #[error("no transaction data provided")]
    NoTransactions,

    #[error("could not parse transaction data: {0}")]
    Ingest(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("artifact {path}: {reason}")]
    Artifact { path: PathBuf, reason: String },

    #[error("ONNX runtime error: {0}")]
    Onnx(#[from] ort::OrtError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ScoringError {
    pub fn ingest(msg: impl Into<String>) -> Self {
        Self::Ingest(msg.into())
    }

    pub fn artifact(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::Artifact {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Failures of the optional text-generation collaborator. These never leave
/// the recommendation step; the template narrative is used instead.
#[derive(Error, Debug)]
pub enum NarrativeError {
    #[error("narrative generation disabled")]
    Disabled,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("service returned no text")]
    Empty,
}

pub type Result<T> = std::result::Result<T, ScoringError>;
