//! Extraction Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};

/// An extraction error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The page could not be loaded; treat it as yielding nothing.
    #[display("unable to load page: {_0}")]
    Navigation(#[error(not(source))] String),
    /// Querying the rendered page failed part-way.
    #[display("DOM query failed")]
    Dom,
    /// The lightbox never opened or held no usable image; fall back to the
    /// thumbnail.
    #[display("overlay did not reveal an image")]
    Overlay,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Navigation(_))
    }
}
