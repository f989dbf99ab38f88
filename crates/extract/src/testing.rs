//! Page wrappers for exercising DOM failures.

use async_trait::async_trait;
use galerie_client::Page;
use galerie_client::browser::{MockElement, MockPage};
use galerie_client::error::{ErrorKind, Result};
use std::time::Duration;

/// A [`MockPage`] on which reading one attribute of one element always fails,
/// the way a handle does once Chromium has dropped its node.
pub(crate) struct BrokenAttribute {
    inner: MockPage,
    element: MockElement,
    name: &'static str,
}
impl BrokenAttribute {
    pub fn new(inner: MockPage, element: MockElement, name: &'static str) -> Self {
        Self { inner, element, name }
    }
}

#[async_trait]
impl Page for BrokenAttribute {
    type Element = MockElement;

    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        self.inner.navigate(url, timeout).await
    }

    async fn title(&self) -> Result<String> {
        self.inner.title().await
    }

    async fn query_all(&self, selector: &str) -> Result<Vec<MockElement>> {
        self.inner.query_all(selector).await
    }

    async fn attribute(&self, element: &MockElement, name: &str) -> Result<Option<String>> {
        if *element == self.element && name == self.name {
            exn::bail!(ErrorKind::StaleElement);
        }
        self.inner.attribute(element, name).await
    }

    async fn inner_text(&self, element: &MockElement) -> Result<String> {
        self.inner.inner_text(element).await
    }

    async fn inner_html(&self, element: &MockElement) -> Result<String> {
        self.inner.inner_html(element).await
    }

    async fn click(&self, element: &MockElement) -> Result<()> {
        self.inner.click(element).await
    }

    async fn wait_for_selector(&self, selector: &str, timeout: Duration) -> Result<MockElement> {
        self.inner.wait_for_selector(selector, timeout).await
    }

    async fn close(&self) -> Result<()> {
        self.inner.close().await
    }
}
