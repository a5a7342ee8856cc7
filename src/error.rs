use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Everything that can go wrong while writing records, clustering or recommending.
#[derive(Error, Debug)]
pub enum Error {
    /// Reading or writing a file / directory failed
    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },

    /// A record could not be encoded / decoded
    #[error("record encoding error: {0}")]
    Encoding(#[from] bincode::Error),

    /// The ratings file could not be parsed
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A file exists, but is not a record file of the expected key / value types
    #[error("invalid record file {path}: {reason}")]
    InvalidRecordFile { path: PathBuf, reason: String },

    /// Parameters that can not work together (e.g. more clusters than points)
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// An operation that needs at least one element got none
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Vectors of differing dimensions were mixed
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// A report could not be written to its destination
    #[error("writing the report failed: {0}")]
    Report(#[source] std::io::Error),

    /// The data model does not know the requested user
    #[error("no such user: {0}")]
    NoSuchUser(i64),

    /// A line of the ratings file could not be turned into a preference
    #[error("invalid rating in line {line}: {reason}")]
    InvalidRating { line: u64, reason: String },
}

/// Attach the path that was operated on to an [`std::io::Error`].
pub(crate) fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |source| Error::Io { path: path.to_path_buf(), source }
}
