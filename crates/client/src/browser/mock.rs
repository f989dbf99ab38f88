//! In-memory browser for testing.

use super::{Browser, Page};
use crate::error::{ErrorKind, Result};
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

/// Markup shown when a thumbnail with a registered [`Lightbox`] is clicked.
#[derive(Debug, Clone)]
pub struct Lightbox {
    pub src: String,
    pub caption_html: String,
}

/// A fixed website: URL to HTML, plus lightbox behaviour for thumbnails.
///
/// Pages are served verbatim (no script execution). Clicking an `img` whose
/// `src` attribute has a registered [`Lightbox`] appends an overlay using the
/// usual `.mfp-img`/`.mfp-title`/`.mfp-close` markup; clicking `.mfp-close`
/// removes it again.
///
/// # Examples
///
/// ```ignore
/// use galerie_client::browser::{MockBrowser, MockSite};
///
/// let site = MockSite::default()
///     .page("https://example.com/", "<html><body><img src='images/1/a.jpg'></body></html>")
///     .lightbox("images/1/a.jpg", "images/1/big/a.jpg", "<b>Title</b><br>Oil 40 x 50 cm");
/// let browser = MockBrowser::new(site);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockSite {
    pages: HashMap<String, String>,
    lightboxes: HashMap<String, Lightbox>,
}
impl MockSite {
    pub fn page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    pub fn lightbox(
        mut self,
        thumbnail_src: impl Into<String>,
        full_src: impl Into<String>,
        caption_html: impl Into<String>,
    ) -> Self {
        let lightbox = Lightbox { src: full_src.into(), caption_html: caption_html.into() };
        self.lightboxes.insert(thumbnail_src.into(), lightbox);
        self
    }
}

pub struct MockBrowser {
    site: Arc<MockSite>,
    navigations: Arc<Mutex<Vec<String>>>,
}
impl MockBrowser {
    pub fn new(site: MockSite) -> Self {
        Self { site: Arc::new(site), navigations: Arc::default() }
    }

    /// Every URL requested through any page of this browser, in order.
    pub async fn navigations(&self) -> Vec<String> {
        self.navigations.lock().await.clone()
    }
}

#[async_trait]
impl Browser for MockBrowser {
    type Page = MockPage;

    async fn new_page(&self) -> Result<MockPage> {
        Ok(MockPage {
            site: Arc::clone(&self.site),
            navigations: Arc::clone(&self.navigations),
            state: Mutex::default(),
        })
    }
}

#[derive(Default)]
struct PageState {
    html: String,
    overlay: Option<String>,
}

pub struct MockPage {
    site: Arc<MockSite>,
    navigations: Arc<Mutex<Vec<String>>>,
    state: Mutex<PageState>,
}

/// Position of the element among all elements of the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockElement(usize);

fn selector(css: &str) -> Result<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Ok(selector),
        Err(_) => exn::bail!(ErrorKind::Dom(format!("invalid selector: {css}"))),
    }
}

/// Parsed view over the current markup. [`Html`] is not `Send`, so every
/// query parses afresh inside a synchronous scope.
struct Dom {
    html: Html,
    all: Selector,
}
impl Dom {
    fn parse(markup: &str) -> Result<Self> {
        Ok(Self { html: Html::parse_document(markup), all: selector("*")? })
    }

    fn ordinal(&self, element: ElementRef<'_>) -> Option<usize> {
        self.html.select(&self.all).position(|e| e.id() == element.id())
    }

    fn get(&self, element: MockElement) -> Result<ElementRef<'_>> {
        match self.html.select(&self.all).nth(element.0) {
            Some(el) => Ok(el),
            None => exn::bail!(ErrorKind::StaleElement),
        }
    }

    fn select(&self, css: &str) -> Result<Vec<MockElement>> {
        let selector = selector(css)?;
        Ok(self.html.select(&selector).filter_map(|el| self.ordinal(el)).map(MockElement).collect())
    }
}

impl MockPage {
    async fn markup(&self) -> String {
        let state = self.state.lock().await;
        match &state.overlay {
            Some(overlay) => format!("{}{}", state.html, overlay),
            None => state.html.clone(),
        }
    }

    async fn with_dom<T>(&self, f: impl FnOnce(&Dom) -> Result<T>) -> Result<T> {
        let markup = self.markup().await;
        let dom = Dom::parse(&markup)?;
        f(&dom)
    }

    fn overlay_markup(lightbox: &Lightbox) -> String {
        format!(
            r#"<div class="mfp-wrap"><figure><img class="mfp-img" src="{}"><figcaption><div class="mfp-title">{}</div></figcaption></figure><button class="mfp-close">×</button></div>"#,
            lightbox.src, lightbox.caption_html
        )
    }
}

#[async_trait]
impl Page for MockPage {
    type Element = MockElement;

    async fn navigate(&self, url: &str, _timeout: Duration) -> Result<()> {
        self.navigations.lock().await.push(url.to_string());
        let key = url.split('#').next().unwrap_or(url);
        let Some(html) = self.site.pages.get(key) else {
            exn::bail!(ErrorKind::Navigation(format!("{url}: no such page")));
        };
        let mut state = self.state.lock().await;
        state.html = html.clone();
        state.overlay = None;
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        self.with_dom(|dom| {
            let title = selector("title")?;
            Ok(dom.html.select(&title).next().map(|t| t.text().collect::<String>().trim().to_string()).unwrap_or_default())
        })
        .await
    }

    async fn query_all(&self, css: &str) -> Result<Vec<MockElement>> {
        self.with_dom(|dom| dom.select(css)).await
    }

    async fn attribute(&self, element: &MockElement, name: &str) -> Result<Option<String>> {
        let element = *element;
        self.with_dom(move |dom| Ok(dom.get(element)?.value().attr(name).map(str::to_string))).await
    }

    async fn inner_text(&self, element: &MockElement) -> Result<String> {
        let element = *element;
        self.with_dom(move |dom| Ok(dom.get(element)?.text().collect())).await
    }

    async fn inner_html(&self, element: &MockElement) -> Result<String> {
        let element = *element;
        self.with_dom(move |dom| Ok(dom.get(element)?.inner_html())).await
    }

    async fn click(&self, element: &MockElement) -> Result<()> {
        enum Effect {
            Open(String),
            Close,
            Nothing,
        }
        let element = *element;
        let site = Arc::clone(&self.site);
        let effect = self
            .with_dom(move |dom| {
                let el = dom.get(element)?.value();
                if el.classes().any(|c| c == "mfp-close") {
                    return Ok(Effect::Close);
                }
                if el.name() == "img"
                    && let Some(src) = el.attr("src")
                    && let Some(lightbox) = site.lightboxes.get(src)
                {
                    return Ok(Effect::Open(Self::overlay_markup(lightbox)));
                }
                Ok(Effect::Nothing)
            })
            .await?;
        let mut state = self.state.lock().await;
        match effect {
            Effect::Open(overlay) => state.overlay = Some(overlay),
            Effect::Close => state.overlay = None,
            Effect::Nothing => {},
        }
        Ok(())
    }

    async fn wait_for_selector(&self, css: &str, timeout: Duration) -> Result<MockElement> {
        // Nothing renders asynchronously here, so the answer never changes.
        match self.query(css).await? {
            Some(element) => Ok(element),
            None => exn::bail!(ErrorKind::Timeout(timeout.as_millis())),
        }
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        *state = PageState::default();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(1);

    fn site() -> MockSite {
        MockSite::default()
            .page(
                "https://example.com/",
                r#"<html><head><title> Home </title></head><body>
                    <div id="grid"><img src="images/1/a.jpg" alt="A"><img src="images/1/b.jpg"></div>
                    <a href="?num=2">2</a>
                </body></html>"#,
            )
            .lightbox("images/1/a.jpg", "images/1/big/a.jpg", "<b>Title</b><br>Oil 40 x 50 cm")
    }

    #[tokio::test]
    async fn test_navigate_and_query() {
        let browser = MockBrowser::new(site());
        let page = browser.new_page().await.unwrap();
        page.navigate("https://example.com/#top", TIMEOUT).await.unwrap();
        assert_eq!(page.title().await.unwrap(), "Home");
        let images = page.query_all("img").await.unwrap();
        assert_eq!(images.len(), 2);
        assert_eq!(page.attribute(&images[0], "alt").await.unwrap().as_deref(), Some("A"));
        assert_eq!(page.attribute(&images[1], "alt").await.unwrap(), None);
        assert_eq!(page.query("#grid img").await.unwrap().as_ref(), images.first());
        assert_eq!(browser.navigations().await, vec!["https://example.com/#top".to_string()]);
    }

    #[tokio::test]
    async fn test_unknown_page_fails_navigation() {
        let browser = MockBrowser::new(site());
        let page = browser.new_page().await.unwrap();
        let err = page.navigate("https://example.com/missing", TIMEOUT).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Navigation(_)));
    }

    #[tokio::test]
    async fn test_lightbox_opens_and_closes() {
        let browser = MockBrowser::new(site());
        let page = browser.new_page().await.unwrap();
        page.navigate("https://example.com/", TIMEOUT).await.unwrap();
        let images = page.query_all("img").await.unwrap();

        page.click(&images[0]).await.unwrap();
        let full = page.wait_for_selector(".mfp-img", TIMEOUT).await.unwrap();
        assert_eq!(page.attribute(&full, "src").await.unwrap().as_deref(), Some("images/1/big/a.jpg"));
        let title = page.wait_for_selector(".mfp-title", TIMEOUT).await.unwrap();
        assert_eq!(page.inner_html(&title).await.unwrap(), "<b>Title</b><br>Oil 40 x 50 cm");

        let close = page.query(".mfp-close").await.unwrap().unwrap();
        page.click(&close).await.unwrap();
        assert!(page.query(".mfp-img").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_click_without_lightbox_times_out() {
        let browser = MockBrowser::new(site());
        let page = browser.new_page().await.unwrap();
        page.navigate("https://example.com/", TIMEOUT).await.unwrap();
        let images = page.query_all("img").await.unwrap();
        page.click(&images[1]).await.unwrap();
        let err = page.wait_for_selector(".mfp-img", TIMEOUT).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Timeout(1000)));
    }
}
