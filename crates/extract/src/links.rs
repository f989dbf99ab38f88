use crate::consts::LINK_CSS;
use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use galerie_client::Page;

/// A raw `<a href>` as found on the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub href: String,
    pub text: String,
}
impl Anchor {
    pub fn new(href: impl Into<String>, text: impl Into<String>) -> Self {
        Self { href: href.into(), text: text.into() }
    }
}

/// Every anchor with an `href`, in document order.
pub(crate) async fn anchors<P: Page>(page: &P) -> Result<Vec<Anchor>> {
    let elements = page.query_all(LINK_CSS).await.or_raise(|| ErrorKind::Dom)?;
    let mut anchors = Vec::with_capacity(elements.len());
    for element in elements {
        let href = match page.attribute(&element, "href").await {
            Ok(Some(href)) => href,
            Ok(None) => continue,
            Err(err) => {
                tracing::debug!(error = ?err, "Unable to read link target; skipping anchor");
                continue;
            },
        };
        let text = match page.inner_text(&element).await {
            Ok(text) => text,
            Err(err) => {
                tracing::debug!(href = %href, error = ?err, "Unable to read link text; skipping anchor");
                continue;
            },
        };
        anchors.push(Anchor { href, text: text.trim().to_string() });
    }
    Ok(anchors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::BrokenAttribute;
    use galerie_client::browser::{Browser, MockBrowser, MockSite};
    use std::time::Duration;

    const PAGE: &str = "https://x.com/default.asp?galerie=3&ng=Fleurs";

    #[tokio::test]
    async fn test_unreadable_anchor_is_skipped() {
        let site = MockSite::default().page(
            PAGE,
            r#"<a href="?num=1"> 1 </a><a href="?num=2">2</a><a href="?num=3">3</a><a name="top">Top</a>"#,
        );
        let browser = MockBrowser::new(site);
        let page = browser.new_page().await.unwrap();
        page.navigate(PAGE, Duration::from_secs(1)).await.unwrap();
        let second = page.query_all("a[href]").await.unwrap()[1];
        let page = BrokenAttribute::new(page, second, "href");

        let found = anchors(&page).await.unwrap();
        assert_eq!(found, vec![Anchor::new("?num=1", "1"), Anchor::new("?num=3", "3")]);
    }
}
