pub mod browser;
mod chrome;
pub mod error;
pub mod http;

pub use crate::browser::{Browser, ChromiumBrowser, Page};
pub use crate::chrome::Chrome;
pub use crate::http::{Fetched, Fetcher, HttpFetcher};

/// User agent sent with direct image downloads.
pub const USER_AGENT: &str = concat!("galerie/", env!("CARGO_PKG_VERSION"));
