//! Library Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Each pipeline raises its own
//! module-level kind (see [`crate::crawl::error`], [`crate::download::error`]
//! and [`crate::rename::error`]); this one is what callers of the public
//! entry points see.

use derive_more::{Display, Error};

/// A library error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("crawl failed")]
    Crawl,
    #[display("batch rename failed")]
    Rename,
    #[display("unable to read collection")]
    Stats,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            _ => false,
        }
    }
}
