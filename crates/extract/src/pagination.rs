//! Pagination discovery within a single category.

use crate::classify::{extract_category, extract_param, resolve_link};
use crate::error::Result;
use crate::links::{Anchor, anchors};
use galerie_client::Page;
use galerie_config::SiteConfig;
use std::collections::HashSet;
use tracing::instrument;
use url::Url;

/// Pagination links on `page` (currently showing `url`) that stay inside the
/// category `url` belongs to.
#[instrument(skip_all, fields(url = %url))]
pub async fn discover_pagination<P: Page>(page: &P, url: &Url, site: &SiteConfig) -> Result<Vec<Url>> {
    let links = select_pagination(url, &anchors(page).await?, site);
    tracing::debug!(links = links.len(), "Discovered pagination links");
    Ok(links)
}

/// Keep links whose category equals the page's own category and that look
/// like page numbers: either the visible text is all digits or the URL
/// carries the page parameter. Document order, first occurrence wins.
pub fn select_pagination(url: &Url, anchors: &[Anchor], site: &SiteConfig) -> Vec<Url> {
    let own = extract_category(url, &site.category_param);
    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for anchor in anchors {
        let Some(target) = resolve_link(url, &anchor.href) else {
            continue;
        };
        if extract_category(&target, &site.category_param) != own {
            continue;
        }
        let numeric = !anchor.text.is_empty() && anchor.text.chars().all(|c| c.is_ascii_digit());
        if !numeric && extract_param(&target, &site.page_param).is_none() {
            continue;
        }
        if seen.insert(target.clone()) {
            links.push(target);
        }
    }
    links
}
