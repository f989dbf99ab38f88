//! Browser automation capability.
//!
//! The crawler only ever talks to a rendered page through the [`Page`] trait,
//! so the same crawl logic runs against a real headless Chromium
//! ([`ChromiumBrowser`]) or an in-memory site ([`MockBrowser`], behind the
//! `mock` feature).
//!
//! Element handles are opaque: they are only meaningful to the page that
//! produced them, and may go stale once the DOM changes underneath them.

mod chromium;
#[cfg(any(test, feature = "mock"))]
mod mock;

pub use self::chromium::{ChromiumBrowser, ChromiumElement, ChromiumPage};
#[cfg(any(test, feature = "mock"))]
pub use self::mock::{Lightbox, MockBrowser, MockElement, MockPage, MockSite};
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Something that can open rendered pages.
#[async_trait]
pub trait Browser: Send + Sync {
    type Page: Page;

    /// Open a fresh, blank tab.
    async fn new_page(&self) -> Result<Self::Page>;
}

/// A single rendered page (browser tab).
#[async_trait]
pub trait Page: Send + Sync {
    type Element: Send + Sync;

    /// Load `url` and wait until the network settles, bounded by `timeout`.
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// The document title, or an empty string when the page has none.
    async fn title(&self) -> Result<String>;

    /// All elements matching a CSS selector, in document order.
    async fn query_all(&self, selector: &str) -> Result<Vec<Self::Element>>;

    /// The first element matching a CSS selector, if any.
    async fn query(&self, selector: &str) -> Result<Option<Self::Element>> {
        Ok(self.query_all(selector).await?.into_iter().next())
    }

    async fn attribute(&self, element: &Self::Element, name: &str) -> Result<Option<String>>;

    async fn inner_text(&self, element: &Self::Element) -> Result<String>;

    async fn inner_html(&self, element: &Self::Element) -> Result<String>;

    async fn click(&self, element: &Self::Element) -> Result<()>;

    /// Resolve once an element matching `selector` exists, or fail with
    /// [`ErrorKind::Timeout`](crate::error::ErrorKind::Timeout).
    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<Self::Element>;

    /// Close the tab. Further calls on this page are undefined.
    async fn close(&self) -> Result<()>;
}
