//! Lightbox interaction.
//!
//! Opening an overlay is a scoped acquisition: whatever happens while reading
//! it, [`reveal`] closes it before returning so the next thumbnail starts
//! from a clean page.

use crate::caption::{Caption, parse_caption};
use crate::error::{ErrorKind, Result};
use exn::{OptionExt, ResultExt};
use galerie_client::Page;
use std::time::Duration;

pub(crate) struct OverlaySelectors<'a> {
    pub image: &'a str,
    pub caption: &'a str,
    pub close: &'a str,
}

/// What an opened lightbox shows.
#[derive(Debug)]
pub(crate) struct Revealed {
    pub src: String,
    pub caption: Caption,
}

/// Click `thumbnail`, read the lightbox, close it.
pub(crate) async fn reveal<P: Page>(
    page: &P,
    thumbnail: &P::Element,
    selectors: &OverlaySelectors<'_>,
    timeout: Duration,
    pause: Duration,
) -> Result<Revealed> {
    let revealed = read(page, thumbnail, selectors, timeout).await;
    close(page, selectors.close, pause).await;
    revealed
}

async fn read<P: Page>(
    page: &P,
    thumbnail: &P::Element,
    selectors: &OverlaySelectors<'_>,
    timeout: Duration,
) -> Result<Revealed> {
    page.click(thumbnail).await.or_raise(|| ErrorKind::Overlay)?;
    let image = page.wait_for_selector(selectors.image, timeout).await.or_raise(|| ErrorKind::Overlay)?;
    let src = page
        .attribute(&image, "src")
        .await
        .or_raise(|| ErrorKind::Overlay)?
        .filter(|src| !src.trim().is_empty())
        .ok_or_raise(|| ErrorKind::Overlay)?;
    let caption = match page.query(selectors.caption).await.or_raise(|| ErrorKind::Overlay)? {
        Some(element) => parse_caption(&page.inner_html(&element).await.or_raise(|| ErrorKind::Overlay)?),
        None => Caption::default(),
    };
    Ok(Revealed { src, caption })
}

async fn close<P: Page>(page: &P, selector: &str, pause: Duration) {
    match page.query(selector).await {
        Ok(Some(button)) => {
            if let Err(err) = page.click(&button).await {
                tracing::debug!(error = ?err, "Unable to close overlay");
            }
            tokio::time::sleep(pause).await;
        },
        Ok(None) => {},
        Err(err) => tracing::debug!(error = ?err, "Unable to look for overlay close button"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galerie_client::browser::{Browser, MockBrowser, MockSite};

    const SELECTORS: OverlaySelectors<'static> =
        OverlaySelectors { image: ".mfp-img", caption: ".mfp-title", close: ".mfp-close" };
    const TIMEOUT: Duration = Duration::from_millis(50);

    fn site() -> MockSite {
        MockSite::default()
            .page(
                "https://x.com/",
                r#"<html><body><img src="images/1/a.jpg"><img src="images/1/b.jpg"></body></html>"#,
            )
            .lightbox("images/1/a.jpg", "images/1/big/a.jpg", "<b>Iris</b><br>Huile 40 x 50 cm")
    }

    #[tokio::test]
    async fn test_reveal_reads_and_closes() {
        let browser = MockBrowser::new(site());
        let page = browser.new_page().await.unwrap();
        page.navigate("https://x.com/", TIMEOUT).await.unwrap();
        let thumbs = page.query_all("img").await.unwrap();

        let revealed = reveal(&page, &thumbs[0], &SELECTORS, TIMEOUT, Duration::ZERO).await.unwrap();
        assert_eq!(revealed.src, "images/1/big/a.jpg");
        assert_eq!(revealed.caption.title, "Iris");
        assert_eq!(revealed.caption.dimensions, "40x50cm");
        assert!(page.query(".mfp-img").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reveal_without_lightbox_fails_cleanly() {
        let browser = MockBrowser::new(site());
        let page = browser.new_page().await.unwrap();
        page.navigate("https://x.com/", TIMEOUT).await.unwrap();
        let thumbs = page.query_all("img").await.unwrap();

        let err = reveal(&page, &thumbs[1], &SELECTORS, TIMEOUT, Duration::ZERO).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Overlay);
        assert!(page.query(".mfp-img").await.unwrap().is_none());
    }
}
