//! Error types for the roadrisk library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for roadrisk operations.
#[derive(Debug, Error)]
pub enum RoadriskError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Empty file or no data to process.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A pipeline input artifact does not exist.
    #[error("Missing {kind} at '{path}'")]
    MissingArtifact { kind: &'static str, path: PathBuf },

    /// A severity class has too few labeled rows to stratify the split.
    #[error(
        "Insufficient data: class '{class}' has {count} labeled row(s), \
         at least {required} per class are needed for a stratified split"
    )]
    InsufficientData {
        class: String,
        count: usize,
        required: usize,
    },

    /// No rows carry a severity label.
    #[error("Insufficient data: no rows with a severity label")]
    NoLabeledRows,

    /// A feature the model was trained on is absent from the prediction row.
    #[error("Missing feature '{0}' in prediction row")]
    MissingFeature(String),

    /// Error saving or loading an artifact.
    #[error("Persistence error: {0}")]
    Persistence(String),
}

/// Result type alias for roadrisk operations.
pub type Result<T> = std::result::Result<T, RoadriskError>;
