//! Error types for the [`rename`](super) module.
//!
//! Uses [`exn`] for automatic location tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

/// A rename error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for rename operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies why a record (or a whole metadata file) was not renamed.
///
/// ### Per-record errors (counted, the batch continues)
/// - [`ErrorKind::MissingFile`]
/// - [`ErrorKind::Move`]
///
/// ### Per-file errors
/// - [`ErrorKind::Metadata`]
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// The record's `local_path` does not exist (or the record has no path).
    #[display("file not found: {}", _0.display())]
    MissingFile(#[error(not(source))] PathBuf),
    /// Creating the target directory or moving the file failed.
    #[display("unable to move {}", _0.display())]
    Move(#[error(not(source))] PathBuf),
    /// The metadata file could not be read or written back.
    #[display("unable to update metadata {}", _0.display())]
    Metadata(#[error(not(source))] PathBuf),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Move(_))
    }
}
