use std::path::PathBuf;
use thiserror::Error;

/// Error type returned by every fallible entry point in the engine, from the
/// page codec up through the executor.
#[derive(Error, Debug)]
pub enum RootDbError {
    #[error("parse error at position {position}: {message}")]
    ParseError { position: usize, message: String },

    #[error("schema error: {0}")]
    SchemaError(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("type error: {0}")]
    TypeError(String),

    #[error("corrupted page {0}: checksum mismatch")]
    CorruptedPage(u64),

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported: {0}")]
    Unsupported(String),
}

impl RootDbError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RootDbError::Io { path: path.into(), source }
    }
}

pub type Result<T> = std::result::Result<T, RootDbError>;
