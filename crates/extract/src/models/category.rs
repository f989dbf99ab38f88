use url::Url;

/// A gallery category as advertised on the gallery page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    /// Decoded display name (the `ng` query parameter).
    pub name: String,
    /// Opaque site identifier (the `galerie` query parameter); unique per scrape.
    pub value: String,
    /// Absolute URL of the category's first page.
    pub url: Url,
    /// Visible text of the link, which may differ from `name`.
    pub link_text: String,
}
