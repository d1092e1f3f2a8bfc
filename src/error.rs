use std::path::PathBuf;
use thiserror::Error;

/// Crate result type
pub type Result<T> = std::result::Result<T, MantleError>;

/// Errors raised while building rocks, evaluating them, or comparing series.
#[derive(Debug, Error)]
pub enum MantleError {
    /// Fraction set is negative, empty, or does not sum to one.
    #[error("invalid composition: {0}")]
    InvalidComposition(String),

    /// State outside a constituent's valid domain, or a property the source cannot produce.
    #[error("evaluation failed: {0}")]
    Evaluation(String),

    #[error("series misaligned: expected {expected} samples, found {found}")]
    Alignment { expected: usize, found: usize },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("csv output failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("malformed json: {0}")]
    Json(#[from] serde_json::Error),
}
