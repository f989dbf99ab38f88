//! Image discovery on a rendered gallery page.

mod overlay;

use self::overlay::{OverlaySelectors, reveal};
use crate::caption::Caption;
use crate::classify::{is_gallery_image, resolve_asset, slideshow_full_resolution};
use crate::consts::GALLERY_IMAGE_CSS;
use crate::error::{ErrorKind, Result};
use crate::models::{ImageDescriptor, Variant};
use crate::text::clean_text;
use exn::ResultExt;
use galerie_client::Page;
use galerie_config::Config;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::instrument;
use url::Url;

/// Turns a loaded page into [`ImageDescriptor`]s.
///
/// Thumbnails are handled strictly one after another: each one may open the
/// page's single lightbox, which has to be closed before the next click.
pub struct PageExtractor<'a> {
    selectors: OverlaySelectors<'a>,
    overlay_timeout: Duration,
    overlay_pause: Duration,
}
impl<'a> PageExtractor<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self {
            selectors: OverlaySelectors {
                image: &config.site.overlay_image_selector,
                caption: &config.site.overlay_caption_selector,
                close: &config.site.overlay_close_selector,
            },
            overlay_timeout: config.crawl.overlay_timeout(),
            overlay_pause: config.crawl.overlay_pause(),
        }
    }

    /// Every gallery image on `page`, which must already show `url`.
    ///
    /// A thumbnail whose lightbox does not open is still reported, as a
    /// [`Variant::Preview`] of itself with an empty caption. Images without a
    /// usable `src`, or whose attributes cannot be read, are skipped without
    /// affecting the others.
    #[instrument(skip_all, fields(url = %url, images))]
    pub async fn extract<P: Page>(&self, page: &P, url: &Url) -> Result<Vec<ImageDescriptor>> {
        let page_title = clean_text(&page.title().await.or_raise(|| ErrorKind::Dom)?);
        let elements = page.query_all(GALLERY_IMAGE_CSS).await.or_raise(|| ErrorKind::Dom)?;
        let mut found = Vec::new();
        for element in elements {
            let src = match page.attribute(&element, "src").await {
                Ok(Some(src)) => src,
                Ok(None) => continue,
                Err(err) => {
                    tracing::debug!(error = ?err, "Unable to read image source; skipping element");
                    continue;
                },
            };
            let Some(thumbnail) = resolve_asset(url, &src).filter(is_gallery_image) else {
                continue;
            };
            let alt_text = match page.attribute(&element, "alt").await {
                Ok(alt) => clean_text(alt.as_deref().unwrap_or_default()),
                Err(err) => {
                    tracing::debug!(thumbnail = %thumbnail, error = ?err, "Unable to read alt text; skipping element");
                    continue;
                },
            };
            let descriptor = |image: Url, fallback_url: Option<Url>, variant: Variant, caption: Caption| ImageDescriptor {
                url: image,
                fallback_url,
                variant,
                alt_text: alt_text.clone(),
                caption,
                page_url: url.clone(),
                page_title: page_title.clone(),
                found_at: OffsetDateTime::now_utc(),
            };

            if let Some(full) = slideshow_full_resolution(&thumbnail) {
                tracing::trace!(thumbnail = %thumbnail, guess = %full, "Slideshow thumbnail");
                found.push(descriptor(full, Some(thumbnail), Variant::Thumbnail, Caption::default()));
                continue;
            }

            match reveal(page, &element, &self.selectors, self.overlay_timeout, self.overlay_pause).await {
                Ok(revealed) => match resolve_asset(url, &revealed.src) {
                    Some(full) => {
                        tracing::debug!(image = %full, title = %revealed.caption.title, "Overlay revealed image");
                        found.push(descriptor(full, None, Variant::Overlay, revealed.caption));
                    },
                    None => found.push(descriptor(thumbnail, None, Variant::Preview, Caption::default())),
                },
                Err(err) => {
                    tracing::debug!(thumbnail = %thumbnail, error = ?err, "Overlay failed; keeping preview");
                    found.push(descriptor(thumbnail, None, Variant::Preview, Caption::default()));
                },
            }
        }
        tracing::Span::current().record("images", found.len());
        Ok(found)
    }
}
