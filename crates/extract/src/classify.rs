//! URL and category classification.
//!
//! Every function here is pure: no I/O, no configuration state beyond the
//! parameter names handed in.

use crate::consts::{self, MISCELLANEOUS};
use crate::text::fold_diacritics;
use url::Url;

/// Value of query parameter `name`, form-decoded and trimmed.
///
/// Returns `None` when the parameter is absent or blank.
pub fn extract_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// The human-readable category a gallery URL belongs to (the `ng` parameter
/// on the Odexpo gallery).
///
/// ```
/// use galerie_extract::extract_category;
/// use url::Url;
///
/// let url = Url::parse("https://example.com/default.asp?galerie=7&ng=Fauves+%26+Animaux").unwrap();
/// assert_eq!(extract_category(&url, "ng").as_deref(), Some("Fauves & Animaux"));
/// ```
pub fn extract_category(url: &Url, param: &str) -> Option<String> {
    extract_param(url, param)
}

/// Folder-safe slug for a category name.
///
/// Lowercases, folds diacritics, turns whitespace and underscore runs into a
/// single hyphen, drops anything outside `[a-z0-9-]`, then collapses and trims
/// hyphens. Empty results become [`MISCELLANEOUS`]. Applying it twice changes
/// nothing.
///
/// ```
/// use galerie_extract::slugify_category;
///
/// assert_eq!(slugify_category("Fauves & Animaux"), "fauves-animaux");
/// assert_eq!(slugify_category("???"), "miscellaneous");
/// ```
pub fn slugify_category(raw: &str) -> String {
    let folded = fold_diacritics(&raw.to_lowercase());
    let hyphenated = consts::SEPARATOR_RUN_REGEX.replace_all(&folded, "-");
    let kept: String =
        hyphenated.chars().filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-').collect();
    let collapsed = consts::HYPHEN_RUN_REGEX.replace_all(&kept, "-");
    match collapsed.trim_matches('-') {
        "" => MISCELLANEOUS.to_string(),
        slug => slug.to_string(),
    }
}

/// Copy of `url` without its fragment.
pub fn normalize_url(url: &Url) -> Url {
    let mut url = url.clone();
    url.set_fragment(None);
    url
}

/// Resolve a link `href` against the page it appeared on.
///
/// Only `http(s)` targets are kept; fragments are dropped so `page#top` and
/// `page` are the same page.
pub fn resolve_link(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }
    let url = base.join(href).ok()?;
    matches!(url.scheme(), "http" | "https").then(|| normalize_url(&url))
}

/// Resolve an image `src`.
///
/// Bare relative sources (`images/12/a.jpg`) are rooted at the site root
/// rather than the current directory, matching how the gallery serves them
/// from `default.asp` pages.
pub fn resolve_asset(base: &Url, src: &str) -> Option<Url> {
    let src = src.trim();
    if src.is_empty() || src.starts_with("data:") {
        return None;
    }
    let url = match Url::parse(src) {
        Ok(url) => url,
        Err(_) if src.starts_with('/') => base.join(src).ok()?,
        Err(_) => base.join(&format!("/{src}")).ok()?,
    };
    matches!(url.scheme(), "http" | "https").then(|| normalize_url(&url))
}

/// `true` for thumbnails whose gallery path has a numeric folder
/// (`images/<id>/...`).
pub fn is_gallery_image(url: &Url) -> bool {
    consts::GALLERY_IMAGE_REGEX.is_match(url.path())
}

/// Slideshow thumbnails are stored next to the full image with a `pt_`
/// prefix. Returns the guessed full-resolution URL.
pub fn slideshow_full_resolution(url: &Url) -> Option<Url> {
    let (dir, file) = url.path().rsplit_once('/')?;
    let full = file.strip_prefix("pt_").filter(|f| !f.is_empty())?;
    let mut guess = url.clone();
    guess.set_path(&format!("{dir}/{full}"));
    Some(guess)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[rstest]
    #[case("https://x.com/default.asp?galerie=1&ng=Paysages", Some("Paysages"))]
    #[case("https://x.com/default.asp?ng=Nature+morte", Some("Nature morte"))]
    #[case("https://x.com/default.asp?ng=%C3%89t%C3%A9%20", Some("Été"))]
    #[case("https://x.com/default.asp?ng=", None)]
    #[case("https://x.com/default.asp?ng=+++", None)]
    #[case("https://x.com/default.asp?galerie=1", None)]
    #[case("https://x.com/", None)]
    fn test_extract_category(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(extract_category(&url(input), "ng").as_deref(), expected);
    }

    #[test]
    fn test_extract_category_is_pure() {
        let input = url("https://x.com/?ng=Portraits&num=2");
        assert_eq!(extract_category(&input, "ng"), extract_category(&input, "ng"));
    }

    #[rstest]
    #[case("Fauves & Animaux", "fauves-animaux")]
    #[case("Nature Morte", "nature-morte")]
    #[case("Été_à  Paris", "ete-a-paris")]
    #[case("  --Portraits--  ", "portraits")]
    #[case("Huile sur toile 40x50", "huile-sur-toile-40x50")]
    #[case("", "miscellaneous")]
    #[case("&&&", "miscellaneous")]
    #[case("miscellaneous", "miscellaneous")]
    fn test_slugify_category(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(slugify_category(raw), expected);
    }

    #[rstest]
    #[case("Fauves & Animaux")]
    #[case("Été_à  Paris")]
    #[case("  ")]
    #[case("A -- B __ C")]
    fn test_slugify_category_is_idempotent(#[case] raw: &str) {
        let once = slugify_category(raw);
        assert_eq!(slugify_category(&once), once);
    }

    #[rstest]
    #[case("?num=2", Some("https://x.com/default.asp?num=2"))]
    #[case("page.asp#top", Some("https://x.com/page.asp"))]
    #[case("#top", None)]
    #[case("", None)]
    #[case("mailto:someone@x.com", None)]
    #[case("javascript:void(0)", None)]
    fn test_resolve_link(#[case] href: &str, #[case] expected: Option<&str>) {
        let base = url("https://x.com/default.asp?page=1");
        assert_eq!(resolve_link(&base, href).as_ref().map(Url::as_str), expected);
    }

    #[rstest]
    #[case("images/12/a.jpg", Some("https://x.com/images/12/a.jpg"))]
    #[case("/images/12/a.jpg", Some("https://x.com/images/12/a.jpg"))]
    #[case("https://cdn.x.com/images/12/a.jpg", Some("https://cdn.x.com/images/12/a.jpg"))]
    #[case("data:image/png;base64,AAAA", None)]
    #[case("  ", None)]
    fn test_resolve_asset(#[case] src: &str, #[case] expected: Option<&str>) {
        let base = url("https://x.com/sub/default.asp?galerie=1");
        assert_eq!(resolve_asset(&base, src).as_ref().map(Url::as_str), expected);
    }

    #[rstest]
    #[case("https://x.com/images/12/a.jpg", true)]
    #[case("https://x.com/images/logo.png", false)]
    #[case("https://x.com/images/ab/a.jpg", false)]
    fn test_is_gallery_image(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_gallery_image(&url(input)), expected);
    }

    #[rstest]
    #[case("https://x.com/images/12/pt_rose.jpg", Some("https://x.com/images/12/rose.jpg"))]
    #[case("https://x.com/images/12/rose.jpg", None)]
    #[case("https://x.com/images/12/pt_", None)]
    fn test_slideshow_full_resolution(#[case] input: &str, #[case] expected: Option<&str>) {
        assert_eq!(slideshow_full_resolution(&url(input)).as_ref().map(Url::as_str), expected);
    }
}
