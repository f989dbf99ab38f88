//! CLI Error Types
//!
//! Only setup failures end up here; everything that goes wrong while
//! crawling an individual page or image is logged and skipped by the
//! library.

use derive_more::{Display, Error};

/// A CLI error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error)]
pub enum ErrorKind {
    #[display("invalid configuration")]
    Config,
    #[display("unable to prepare run directory")]
    Output,
    #[display("unable to set up logging")]
    Logging,
    #[display("unable to start browser")]
    Browser,
    #[display("unable to set up HTTP client")]
    Http,
    #[display("crawl aborted")]
    Crawl,
    #[display("rename aborted")]
    Rename,
    #[display("unable to compute statistics")]
    Stats,
}
