//! Error types for maze generation and solving.

use thiserror::Error;

/// Result type alias for maze operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while generating or solving a maze.
///
/// Finding no exit is not an error: the solver reports it as `Ok(None)`.
#[derive(Error, Debug)]
pub enum Error {
    /// The deadline elapsed before the operation completed.
    #[error("operation cancelled: deadline elapsed")]
    Cancelled,

    /// Input is not a tree of nested room maps and leaf strings.
    #[error("malformed maze: {0}")]
    Malformed(String),

    /// Generation parameters were rejected before any work started.
    #[error("invalid configuration: {0}")]
    Configuration(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.into())
        } else {
            Error::Malformed(err.to_string())
        }
    }
}
