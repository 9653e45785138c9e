//! Library errors.

use std::path::PathBuf;

use thiserror::Error;

/// Library result type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while loading inputs, scoring scenarios, or persisting results.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("missing upstream stage `{stage}`: expected {}", .path.display())]
    MissingUpstream { stage: &'static str, path: PathBuf },

    #[error("column `{column}` not found")]
    MissingColumn { column: String },

    #[error("duplicate column `{column}`")]
    DuplicateColumn { column: String },

    #[error("{}: row {row}, column `{column}`: cannot parse `{value}` as a number", .path.display())]
    Parse {
        path: PathBuf,
        row: usize,
        column: String,
        value: String,
    },

    #[error("feature table has no rows")]
    EmptyTable,

    #[error("length mismatch: expected {expected} values, got {actual}")]
    LengthMismatch { expected: usize, actual: usize },

    #[error("model error: {0}")]
    Model(String),

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }
}
