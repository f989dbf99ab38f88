//! Error types for the [`download`](super) module.
//!
//! Every variant is a reason to skip one image; none of them stop a crawl.

use derive_more::{Display, Error};

/// A download error with automatic location tracking via [`exn::Exn`].
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for download operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Why an image was not downloaded.
///
/// ### Rejections (nothing was fetched or written)
/// - [`ErrorKind::Duplicate`]
/// - [`ErrorKind::ForeignDomain`]
/// - [`ErrorKind::Unsupported`]
///
/// ### Failures
/// - [`ErrorKind::Status`], [`ErrorKind::ContentType`], [`ErrorKind::TooLarge`]
///   and [`ErrorKind::Network`] come from the server side.
/// - [`ErrorKind::Storage`] means the bytes arrived but could not be written.
#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("already downloaded: {_0}")]
    Duplicate(#[error(not(source))] String),
    #[display("outside the allowed domain: {_0}")]
    ForeignDomain(#[error(not(source))] String),
    #[display("not a supported image: {_0}")]
    Unsupported(#[error(not(source))] String),
    #[display("HTTP {_0}")]
    Status(#[error(not(source))] u16),
    #[display("unexpected content type: {_0}")]
    ContentType(#[error(not(source))] String),
    #[display("image larger than {_0} bytes")]
    TooLarge(#[error(not(source))] u64),
    #[display("network error")]
    Network,
    #[display("unable to store image")]
    Storage,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network => true,
            Self::Status(status) => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// `true` when the image was skipped before any request was made.
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Duplicate(_) | Self::ForeignDomain(_) | Self::Unsupported(_))
    }
}
