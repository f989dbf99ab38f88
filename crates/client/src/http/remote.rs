use super::{Fetched, Fetcher};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use tracing::instrument;
use url::Url;

/// [`Fetcher`] backed by a shared [`reqwest::Client`].
#[derive(Clone)]
pub struct HttpFetcher {
    client: Client,
    timeout: Duration,
}
impl HttpFetcher {
    pub fn new(timeout: Duration, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| ErrorKind::Network(e.to_string()))?;
        Ok(Self { client, timeout })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self), fields(url = %url))]
    async fn fetch(&self, url: &Url, limit: u64) -> Result<Fetched> {
        let network = |err: reqwest::Error| match err.is_timeout() {
            true => ErrorKind::Timeout(self.timeout.as_millis()),
            false => ErrorKind::Network(err.to_string()),
        };
        let mut response = self.client.get(url.clone()).send().await.map_err(network)?;
        let status = response.status().as_u16();
        let content_type = response.headers().get(CONTENT_TYPE).and_then(|v| v.to_str().ok()).map(str::to_string);
        if let Some(length) = response.content_length()
            && length > limit
        {
            exn::bail!(ErrorKind::TooLarge(limit));
        }
        let mut bytes = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(network)? {
            if (bytes.len() + chunk.len()) as u64 > limit {
                exn::bail!(ErrorKind::TooLarge(limit));
            }
            bytes.extend_from_slice(&chunk);
        }
        tracing::trace!(status, size = bytes.len(), "Fetched resource");
        Ok(Fetched { status, content_type, bytes })
    }
}
