use crate::caption::Caption;
use time::OffsetDateTime;
use url::Url;

/// How an image URL was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    /// Full resolution, read from the opened lightbox.
    Overlay,
    /// The lightbox failed; this is the thumbnail that was clicked.
    Preview,
    /// A slideshow thumbnail with a guessed full-resolution sibling.
    Thumbnail,
}
impl Variant {
    /// The primary URL is itself a thumbnail.
    pub fn is_preview(&self) -> bool {
        matches!(self, Self::Preview)
    }
}

/// A download-ready image candidate found on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageDescriptor {
    pub url: Url,
    /// Tried when `url` cannot be downloaded.
    pub fallback_url: Option<Url>,
    pub variant: Variant,
    pub alt_text: String,
    pub caption: Caption,
    pub page_url: Url,
    pub page_title: String,
    pub found_at: OffsetDateTime,
}
