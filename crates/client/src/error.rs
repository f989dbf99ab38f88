//! Client Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction. Browser and HTTP failures share a
//! single [`ErrorKind`] so the crawler can decide what to skip without caring
//! which capability produced it.

use derive_more::{Display, Error};

/// A client error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("chrome/chromium not detected on your system")]
    ChromeNotFound,
    /// The browser process could not be started or configured.
    #[display("unable to launch browser: {_0}")]
    Launch(#[error(not(source))] String),
    /// A page could not be opened or did not finish loading.
    #[display("navigation failed: {_0}")]
    Navigation(#[error(not(source))] String),
    /// Waiting on the page (load, selector) exceeded its deadline.
    #[display("timed out after {_0}ms")]
    Timeout(#[error(not(source))] u128),
    /// A DOM query or interaction failed on an otherwise loaded page.
    #[display("DOM operation failed: {_0}")]
    Dom(#[error(not(source))] String),
    /// The element handle no longer refers to anything on the page.
    #[display("stale element handle")]
    StaleElement,
    /// Transport-level HTTP failure (DNS, TLS, connection reset, ...).
    #[display("network error: {_0}")]
    Network(#[error(not(source))] String),
    /// Payload exceeded the caller's size limit.
    #[display("payload exceeds {_0} bytes")]
    TooLarge(#[error(not(source))] u64),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Navigation(_) | Self::Timeout(_) | Self::Network(_))
    }
}
