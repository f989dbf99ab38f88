//! Gallery page and category discovery.

use crate::classify::{extract_category, extract_param, resolve_link};
use crate::error::Result;
use crate::links::{Anchor, anchors};
use crate::models::Category;
use galerie_client::Page;
use galerie_config::SiteConfig;
use std::collections::HashSet;
use tracing::instrument;
use url::Url;

/// Find the link from the home page to the gallery listing.
#[instrument(skip_all, fields(url = %url))]
pub async fn discover_gallery<P: Page>(page: &P, url: &Url, site: &SiteConfig) -> Result<Option<Url>> {
    let gallery = select_gallery(url, &anchors(page).await?, site);
    match &gallery {
        Some(gallery) => tracing::info!(gallery = %gallery, "Found gallery page"),
        None => tracing::warn!("Gallery page not found in navigation"),
    }
    Ok(gallery)
}

/// The first anchor whose href contains a gallery marker, or whose href and
/// text both mention the gallery keyword.
pub fn select_gallery(url: &Url, anchors: &[Anchor], site: &SiteConfig) -> Option<Url> {
    let keyword = site.gallery_keyword.to_lowercase();
    anchors
        .iter()
        .find(|a| {
            site.gallery_markers.iter().any(|marker| a.href.contains(marker.as_str()))
                || (!keyword.is_empty()
                    && a.href.to_lowercase().contains(&keyword)
                    && a.text.to_lowercase().contains(&keyword))
        })
        .and_then(|a| resolve_link(url, &a.href))
}

/// Categories linked from the gallery page, in document order.
#[instrument(skip_all, fields(url = %url))]
pub async fn discover_categories<P: Page>(page: &P, url: &Url, site: &SiteConfig) -> Result<Vec<Category>> {
    let categories = select_categories(url, &anchors(page).await?, site);
    tracing::info!(categories = categories.len(), "Found gallery categories");
    Ok(categories)
}

/// Links carrying both the category id and name parameters, deduplicated by
/// id (first occurrence wins).
pub fn select_categories(url: &Url, anchors: &[Anchor], site: &SiteConfig) -> Vec<Category> {
    let mut seen = HashSet::new();
    let mut categories = Vec::new();
    for anchor in anchors {
        let Some(target) = resolve_link(url, &anchor.href) else {
            continue;
        };
        let (Some(value), Some(name)) =
            (extract_param(&target, &site.category_id_param), extract_category(&target, &site.category_param))
        else {
            continue;
        };
        if !seen.insert(value.clone()) {
            continue;
        }
        tracing::debug!(name = %name, id = %value, "Found category");
        categories.push(Category { name, value, url: target, link_text: anchor.text.clone() });
    }
    categories
}

/// Keep categories whose name or link text contains `needle`
/// (case-insensitive).
pub fn filter_categories(categories: Vec<Category>, needle: &str) -> Vec<Category> {
    let needle = needle.to_lowercase();
    categories
        .into_iter()
        .filter(|c| c.name.to_lowercase().contains(&needle) || c.link_text.to_lowercase().contains(&needle))
        .collect()
}
