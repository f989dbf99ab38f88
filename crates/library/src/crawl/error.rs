//! Error types for the [`crawl`](super) module.

use derive_more::{Display, Error};

/// A crawl error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for crawl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classifies the origin of a crawl failure.
///
/// Only [`ErrorKind::Browser`], [`ErrorKind::Navigation`] on the start page
/// and [`ErrorKind::Metadata`] while preparing a session ever reach the
/// caller. Page-level failures are logged and the page counts as empty.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    /// A tab could not be opened.
    #[display("browser unavailable")]
    Browser,
    /// A page could not be loaded.
    #[display("unable to load {_0}")]
    Navigation(#[error(not(source))] String),
    /// A loaded page could not be read.
    #[display("unable to read page {_0}")]
    Extract(#[error(not(source))] String),
    /// Existing metadata could not be loaded.
    #[display("unable to load existing metadata")]
    Metadata,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Navigation(_))
    }
}
