//! Error types for the analyzer library

use std::path::PathBuf;
use thiserror::Error;

/// Analyzer error type
#[derive(Error, Debug)]
pub enum AnalyzerError {
    /// A result shard name carries no numeric run index
    #[error("malformed file name {}: {reason}", path.display())]
    MalformedFilename { path: PathBuf, reason: String },

    /// A required field is missing or non-numeric in a request-result file
    #[error("malformed record in {} at line {line}: {reason}", path.display())]
    MalformedRecord {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    /// The time-range file is absent or cannot be parsed
    #[error("missing time range {}: {reason}", path.display())]
    MissingTimeRange { path: PathBuf, reason: String },

    /// One controller log line could not be decoded.
    ///
    /// Never returned from a file parse; only reported as a diagnostic.
    #[error("unparsable line {line} in {}: {reason}", path.display())]
    UnparsableLine {
        path: PathBuf,
        line: u64,
        reason: String,
    },

    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error in {}: {source}", path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Worker task failed outside of the analysis itself
    #[error("worker error: {0}")]
    Worker(String),
}

impl AnalyzerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AnalyzerError>;
