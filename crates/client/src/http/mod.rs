//! HTTP download capability.

#[cfg(any(test, feature = "mock"))]
mod mock;
mod remote;

#[cfg(any(test, feature = "mock"))]
pub use self::mock::MockFetcher;
pub use self::remote::HttpFetcher;
use crate::error::Result;
use async_trait::async_trait;
use url::Url;

/// A fully-buffered HTTP response.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub status: u16,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}
impl Fetched {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Fetch a resource in full.
///
/// Implementations must fail with
/// [`ErrorKind::TooLarge`](crate::error::ErrorKind::TooLarge) rather than
/// buffer more than `limit` bytes.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url, limit: u64) -> Result<Fetched>;
}
