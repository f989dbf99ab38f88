//! Headless Chromium driven over the DevTools protocol.

use super::{Browser, Page};
use crate::chrome::Chrome;
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page as CdpPage;
use futures::StreamExt;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::instrument;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn dom_error(err: CdpError) -> ErrorKind {
    ErrorKind::Dom(err.to_string())
}

/// A running Chromium process plus the task pumping its DevTools events.
pub struct ChromiumBrowser {
    browser: CdpBrowser,
    handler: JoinHandle<()>,
}
impl ChromiumBrowser {
    #[instrument(skip_all, fields(chrome = %chrome.path().display(), headless))]
    pub async fn launch(chrome: &Chrome, headless: bool) -> Result<Self> {
        let mut builder = BrowserConfig::builder().chrome_executable(chrome.path());
        if !headless {
            builder = builder.with_head();
        }
        let config = builder.build().map_err(ErrorKind::Launch)?;
        let (browser, mut events) =
            CdpBrowser::launch(config).await.map_err(|e| ErrorKind::Launch(e.to_string()))?;
        // The DevTools connection only makes progress while its event stream
        // is polled; it ends by itself once the browser exits.
        let handler = tokio::spawn(async move {
            while let Some(event) = events.next().await {
                if let Err(err) = event {
                    tracing::trace!(error = %err, "DevTools event error");
                }
            }
        });
        tracing::info!("Browser launched");
        Ok(Self { browser, handler })
    }

    /// Close the browser process and wait for the event loop to drain.
    pub async fn shutdown(mut self) -> Result<()> {
        self.browser.close().await.map_err(|e| ErrorKind::Launch(e.to_string()))?;
        _ = self.browser.wait().await;
        _ = self.handler.await;
        tracing::debug!("Browser closed");
        Ok(())
    }
}

#[async_trait]
impl Browser for ChromiumBrowser {
    type Page = ChromiumPage;

    async fn new_page(&self) -> Result<ChromiumPage> {
        let page = self.browser.new_page("about:blank").await.map_err(|e| ErrorKind::Navigation(e.to_string()))?;
        Ok(ChromiumPage { page })
    }
}

pub struct ChromiumPage {
    page: CdpPage,
}

pub struct ChromiumElement(Element);

#[async_trait]
impl Page for ChromiumPage {
    type Element = ChromiumElement;

    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        let load = async {
            self.page.goto(url).await?;
            self.page.wait_for_navigation().await?;
            Ok::<_, CdpError>(())
        };
        match tokio::time::timeout(timeout, load).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => exn::bail!(ErrorKind::Navigation(format!("{url}: {err}"))),
            Err(_) => exn::bail!(ErrorKind::Timeout(timeout.as_millis())),
        }
    }

    async fn title(&self) -> Result<String> {
        Ok(self.page.get_title().await.map_err(dom_error)?.unwrap_or_default())
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<ChromiumElement>> {
        let elements = self.page.find_elements(selector).await.map_err(dom_error)?;
        Ok(elements.into_iter().map(ChromiumElement).collect())
    }

    async fn attribute(&self, element: &ChromiumElement, name: &str) -> Result<Option<String>> {
        Ok(element.0.attribute(name).await.map_err(dom_error)?)
    }

    async fn inner_text(&self, element: &ChromiumElement) -> Result<String> {
        Ok(element.0.inner_text().await.map_err(dom_error)?.unwrap_or_default())
    }

    async fn inner_html(&self, element: &ChromiumElement) -> Result<String> {
        Ok(element.0.inner_html().await.map_err(dom_error)?.unwrap_or_default())
    }

    async fn click(&self, element: &ChromiumElement) -> Result<()> {
        element.0.click().await.map_err(dom_error)?;
        Ok(())
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<ChromiumElement> {
        let deadline = Instant::now() + timeout;
        loop {
            if let Ok(element) = self.page.find_element(selector).await {
                return Ok(ChromiumElement(element));
            }
            if Instant::now() >= deadline {
                exn::bail!(ErrorKind::Timeout(timeout.as_millis()));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn close(&self) -> Result<()> {
        self.page.clone().close().await.map_err(dom_error)?;
        Ok(())
    }
}
