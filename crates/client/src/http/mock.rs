//! In-memory fetcher for testing.

use super::{Fetched, Fetcher};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use url::Url;

/// Serves canned responses keyed by URL and counts requests per URL.
/// Unknown URLs answer `404`.
#[derive(Default)]
pub struct MockFetcher {
    responses: HashMap<String, Fetched>,
    requests: Mutex<HashMap<String, usize>>,
}
impl MockFetcher {
    pub fn with_image(mut self, url: impl Into<String>, content_type: &str, bytes: impl Into<Vec<u8>>) -> Self {
        let fetched = Fetched { status: 200, content_type: Some(content_type.to_string()), bytes: bytes.into() };
        self.responses.insert(url.into(), fetched);
        self
    }

    pub fn with_status(mut self, url: impl Into<String>, status: u16) -> Self {
        self.responses.insert(url.into(), Fetched { status, content_type: None, bytes: vec![] });
        self
    }

    pub async fn requests(&self, url: &str) -> usize {
        self.requests.lock().await.get(url).copied().unwrap_or(0)
    }

    pub async fn total_requests(&self) -> usize {
        self.requests.lock().await.values().sum()
    }
}

#[async_trait]
impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &Url, limit: u64) -> Result<Fetched> {
        *self.requests.lock().await.entry(url.to_string()).or_default() += 1;
        let Some(fetched) = self.responses.get(url.as_str()) else {
            return Ok(Fetched { status: 404, content_type: None, bytes: vec![] });
        };
        if fetched.bytes.len() as u64 > limit {
            exn::bail!(ErrorKind::TooLarge(limit));
        }
        Ok(fetched.clone())
    }
}
