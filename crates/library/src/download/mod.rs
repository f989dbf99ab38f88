//! Image downloads.
//!
//! The [`Downloader`] turns one [`ImageDescriptor`] into one file on disk and
//! one [`ImageRecord`]. A URL is only ever fetched by whoever holds its
//! [`Claim`](galerie_storage::Claim); the claim is committed after the file
//! has been written, so a failed download leaves the URL free for a later
//! attempt.

pub mod error;

use self::error::{ErrorKind, Result};
use exn::ResultExt;
use galerie_client::Fetcher;
use galerie_client::error::ErrorKind as ClientErrorKind;
use galerie_config::Config;
use galerie_extract::models::{ImageDescriptor, ImageRecord};
use galerie_extract::{extract_category, slugify_category};
use galerie_storage::{DuplicateTracker, RunLayout, sanitize_filename, write_unique};
use time::OffsetDateTime;
use tracing::instrument;
use url::Url;

const PREVIEW_PREFIX: &str = "preview_";

pub struct Downloader<'a, F> {
    fetcher: &'a F,
    config: &'a Config,
    layout: &'a RunLayout,
}

impl<'a, F: Fetcher> Downloader<'a, F> {
    pub fn new(fetcher: &'a F, config: &'a Config, layout: &'a RunLayout) -> Self {
        Self { fetcher, config, layout }
    }

    /// Download the image described by `descriptor`, falling back to its
    /// thumbnail when the primary URL cannot be fetched.
    ///
    /// # Errors
    /// Fails with a rejection kind (see [`ErrorKind::is_rejection`]) without
    /// touching the network or the disk, or with the reason the last
    /// candidate URL failed.
    #[instrument(skip_all, fields(url = %descriptor.url))]
    pub async fn download(&self, descriptor: &ImageDescriptor, tracker: &DuplicateTracker) -> Result<ImageRecord> {
        let primary = self.download_url(&descriptor.url, descriptor, descriptor.variant.is_preview(), tracker).await;
        match (primary, &descriptor.fallback_url) {
            (Ok(record), _) => Ok(record),
            (Err(err), Some(fallback)) if !matches!(&*err, ErrorKind::Duplicate(_)) => {
                tracing::debug!(fallback = %fallback, error = ?err, "Full resolution unavailable, using thumbnail");
                self.download_url(fallback, descriptor, true, tracker).await
            },
            (Err(err), _) => Err(err),
        }
    }

    async fn download_url(
        &self,
        url: &Url,
        descriptor: &ImageDescriptor,
        preview: bool,
        tracker: &DuplicateTracker,
    ) -> Result<ImageRecord> {
        if !url.host_str().is_some_and(|host| self.config.is_allowed_host(host)) {
            exn::bail!(ErrorKind::ForeignDomain(url.to_string()));
        }
        if !has_supported_extension(url, &self.config.download.extensions) {
            exn::bail!(ErrorKind::Unsupported(url.to_string()));
        }
        let Some(claim) = tracker.claim(url.as_str()) else {
            exn::bail!(ErrorKind::Duplicate(url.to_string()));
        };

        let limit = self.config.download.max_image_size;
        let fetched = match self.fetcher.fetch(url, limit).await {
            Ok(fetched) => fetched,
            Err(err) => {
                let kind = match &*err {
                    ClientErrorKind::TooLarge(limit) => ErrorKind::TooLarge(*limit),
                    _ => ErrorKind::Network,
                };
                return Err(err).or_raise(|| kind);
            },
        };
        if !fetched.is_success() {
            exn::bail!(ErrorKind::Status(fetched.status));
        }
        if let Some(content_type) = &fetched.content_type
            && !content_type.trim().to_ascii_lowercase().starts_with("image/")
        {
            exn::bail!(ErrorKind::ContentType(content_type.clone()));
        }
        if fetched.bytes.len() as u64 > limit {
            exn::bail!(ErrorKind::TooLarge(limit));
        }

        let now = OffsetDateTime::now_utc();
        let category = resolve_category(descriptor, &self.config.site.category_param);
        let dir = self.layout.category_dir(&category).or_raise(|| ErrorKind::Storage)?;
        let file_size = fetched.bytes.len() as u64;
        let local_path = write_unique(&dir, &filename_for(url, preview, now), fetched.bytes)
            .await
            .or_raise(|| ErrorKind::Storage)?;
        claim.commit();

        let filename = local_path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
        tracing::info!(file = %local_path.display(), category = %category, bytes = file_size, "Downloaded image");
        Ok(ImageRecord {
            filename,
            original_url: url.to_string(),
            local_path,
            file_size,
            downloaded_at: now,
            source_page: descriptor.page_url.to_string(),
            page_title: descriptor.page_title.clone(),
            alt_text: descriptor.alt_text.clone(),
            title: descriptor.caption.title.clone(),
            painting_type: descriptor.caption.painting_type.clone(),
            dimensions: descriptor.caption.dimensions.clone(),
            category,
            crawl_run: self.layout.run_id(),
            is_preview: preview,
        })
    }
}

/// The category folder for a descriptor: the page's own category parameter
/// if it has one, else the painting type, else the alt text.
pub fn resolve_category(descriptor: &ImageDescriptor, param: &str) -> String {
    let non_blank = |s: &String| !s.trim().is_empty();
    let raw = extract_category(&descriptor.page_url, param)
        .or_else(|| Some(descriptor.caption.painting_type.clone()).filter(non_blank))
        .or_else(|| Some(descriptor.alt_text.clone()).filter(non_blank))
        .unwrap_or_default();
    slugify_category(&raw)
}

fn has_supported_extension(url: &Url, extensions: &[String]) -> bool {
    let path = url.path().to_ascii_lowercase();
    extensions.iter().any(|ext| path.ends_with(&ext.to_ascii_lowercase()))
}

/// Local filename for `url`: its last path segment, decoded and sanitized,
/// or `image_<unix time>.jpg` if that yields nothing usable.
fn filename_for(url: &Url, preview: bool, now: OffsetDateTime) -> String {
    let name = url
        .path_segments()
        .and_then(|segments| segments.last())
        .filter(|segment| !segment.is_empty())
        .map(|segment| urlencoding::decode(segment).map(|s| s.into_owned()).unwrap_or_else(|_| segment.to_string()))
        .and_then(|decoded| sanitize_filename(&decoded))
        .filter(|name| name.contains('.'))
        .unwrap_or_else(|| format!("image_{}.jpg", now.unix_timestamp()));
    match preview {
        true => format!("{PREVIEW_PREFIX}{name}"),
        false => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use galerie_client::http::MockFetcher;
    use galerie_extract::Caption;
    use galerie_extract::models::Variant;
    use rstest::rstest;
    use time::macros::datetime;

    const PAGE: &str = "https://x.com/default.asp?galerie=3&ng=Fleurs";
    const IMAGE: &str = "https://x.com/images/3/iris.jpg";

    fn config() -> Config {
        let mut config = Config::default();
        config.site.allowed_domain = "x.com".to_string();
        config.site.start_url = Url::parse("https://x.com/").unwrap();
        config
    }

    fn descriptor(url: &str) -> ImageDescriptor {
        ImageDescriptor {
            url: Url::parse(url).unwrap(),
            fallback_url: None,
            variant: Variant::Overlay,
            alt_text: "Iris".to_string(),
            caption: Caption {
                title: "Iris bleus".to_string(),
                painting_type: "Huile sur toile".to_string(),
                dimensions: "40x50cm".to_string(),
            },
            page_url: Url::parse(PAGE).unwrap(),
            page_title: "Fleurs".to_string(),
            found_at: OffsetDateTime::UNIX_EPOCH,
        }
    }

    #[tokio::test]
    async fn test_download_writes_file_and_record() {
        let temp_dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::fixed(temp_dir.path());
        let fetcher = MockFetcher::default().with_image(IMAGE, "image/jpeg", b"jpeg".to_vec());
        let config = config();
        let tracker = DuplicateTracker::new();

        let record = Downloader::new(&fetcher, &config, &layout).download(&descriptor(IMAGE), &tracker).await.unwrap();
        assert_eq!(record.filename, "iris.jpg");
        assert_eq!(record.category, "fleurs");
        assert_eq!(record.local_path, temp_dir.path().join("images/fleurs/iris.jpg"));
        assert_eq!(record.file_size, 4);
        assert_eq!(record.title, "Iris bleus");
        assert_eq!(record.dimensions, "40x50cm");
        assert_eq!(record.source_page, PAGE);
        assert!(!record.is_preview);
        assert_eq!(std::fs::read(&record.local_path).unwrap(), b"jpeg");
        assert!(tracker.is_duplicate(IMAGE));
    }

    #[tokio::test]
    async fn test_second_download_is_duplicate() {
        let temp_dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::fixed(temp_dir.path());
        let fetcher = MockFetcher::default().with_image(IMAGE, "image/jpeg", b"jpeg".to_vec());
        let config = config();
        let tracker = DuplicateTracker::new();
        let downloader = Downloader::new(&fetcher, &config, &layout);

        downloader.download(&descriptor(IMAGE), &tracker).await.unwrap();
        let err = downloader.download(&descriptor(IMAGE), &tracker).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Duplicate(_)));
        assert_eq!(fetcher.requests(IMAGE).await, 1);
        assert_eq!(std::fs::read_dir(temp_dir.path().join("images/fleurs")).unwrap().count(), 1);
    }

    #[rstest]
    #[case("https://elsewhere.com/images/3/iris.jpg", "foreign")]
    #[case("https://x.com/images/3/iris.svg", "unsupported")]
    #[case("https://x.com/images/3/", "unsupported")]
    #[tokio::test]
    async fn test_rejections_do_not_fetch(#[case] url: &str, #[case] expected: &str) {
        let temp_dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::fixed(temp_dir.path());
        let fetcher = MockFetcher::default();
        let config = config();
        let tracker = DuplicateTracker::new();

        let err = Downloader::new(&fetcher, &config, &layout).download(&descriptor(url), &tracker).await.unwrap_err();
        match expected {
            "foreign" => assert!(matches!(&*err, ErrorKind::ForeignDomain(_))),
            _ => assert!(matches!(&*err, ErrorKind::Unsupported(_))),
        }
        assert!(err.is_rejection());
        assert_eq!(fetcher.total_requests().await, 0);
        assert!(!tracker.is_duplicate(url));
    }

    #[tokio::test]
    async fn test_www_alias_is_allowed() {
        let temp_dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::fixed(temp_dir.path());
        let url = "https://www.x.com/images/3/iris.png";
        let fetcher = MockFetcher::default().with_image(url, "image/png", b"png".to_vec());
        let config = config();
        let record = Downloader::new(&fetcher, &config, &layout)
            .download(&descriptor(url), &DuplicateTracker::new())
            .await
            .unwrap();
        assert_eq!(record.filename, "iris.png");
    }

    #[tokio::test]
    async fn test_failures_release_the_claim() {
        let temp_dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::fixed(temp_dir.path());
        let fetcher = MockFetcher::default().with_status(IMAGE, 503);
        let config = config();
        let tracker = DuplicateTracker::new();

        let err = Downloader::new(&fetcher, &config, &layout).download(&descriptor(IMAGE), &tracker).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Status(503)));
        assert!(err.is_retryable());
        assert!(!tracker.is_duplicate(IMAGE));
        assert!(!temp_dir.path().join("images").exists());
    }

    #[tokio::test]
    async fn test_content_type_and_size_limits() {
        let temp_dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::fixed(temp_dir.path());
        let html = "https://x.com/images/3/page.jpg";
        let fetcher = MockFetcher::default()
            .with_image(html, "text/html; charset=utf-8", b"<html>".to_vec())
            .with_image(IMAGE, "image/jpeg", vec![0u8; 64]);
        let mut config = config();
        config.download.max_image_size = 32;
        let tracker = DuplicateTracker::new();
        let downloader = Downloader::new(&fetcher, &config, &layout);

        let err = downloader.download(&descriptor(html), &tracker).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::ContentType(_)));
        let err = downloader.download(&descriptor(IMAGE), &tracker).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::TooLarge(32)));
    }

    #[tokio::test]
    async fn test_thumbnail_fallback() {
        let temp_dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::fixed(temp_dir.path());
        let thumbnail = "https://x.com/images/3/pt_iris.jpg";
        let fetcher = MockFetcher::default().with_image(thumbnail, "image/jpeg", b"small".to_vec());
        let config = config();
        let tracker = DuplicateTracker::new();
        let mut slideshow = descriptor(IMAGE);
        slideshow.variant = Variant::Thumbnail;
        slideshow.fallback_url = Some(Url::parse(thumbnail).unwrap());

        let record = Downloader::new(&fetcher, &config, &layout).download(&slideshow, &tracker).await.unwrap();
        assert_eq!(record.original_url, thumbnail);
        assert_eq!(record.filename, "preview_pt_iris.jpg");
        assert!(record.is_preview);
        assert_eq!(fetcher.requests(IMAGE).await, 1);
        assert!(!tracker.is_duplicate(IMAGE));
        assert!(tracker.is_duplicate(thumbnail));
    }

    #[tokio::test]
    async fn test_colliding_names_get_counters() {
        let temp_dir = tempfile::tempdir().unwrap();
        let layout = RunLayout::fixed(temp_dir.path());
        let other = "https://x.com/images/4/iris.jpg";
        let fetcher = MockFetcher::default()
            .with_image(IMAGE, "image/jpeg", b"one".to_vec())
            .with_image(other, "image/jpeg", b"two".to_vec());
        let config = config();
        let tracker = DuplicateTracker::new();
        let downloader = Downloader::new(&fetcher, &config, &layout);

        let first = downloader.download(&descriptor(IMAGE), &tracker).await.unwrap();
        let second = downloader.download(&descriptor(other), &tracker).await.unwrap();
        assert_eq!(first.filename, "iris.jpg");
        assert_eq!(second.filename, "iris_1.jpg");
        assert_ne!(first.local_path, second.local_path);
    }

    #[rstest]
    #[case(PAGE, "Huile", "Iris", "fleurs")]
    #[case("https://x.com/default.asp?page=10076", "Huile sur toile", "Iris", "huile-sur-toile")]
    #[case("https://x.com/default.asp?page=10076", "", "Iris bleus", "iris-bleus")]
    #[case("https://x.com/default.asp?page=10076", " ", "", "miscellaneous")]
    fn test_resolve_category(#[case] page: &str, #[case] painting_type: &str, #[case] alt: &str, #[case] expected: &str) {
        let mut d = descriptor(IMAGE);
        d.page_url = Url::parse(page).unwrap();
        d.caption.painting_type = painting_type.to_string();
        d.alt_text = alt.to_string();
        assert_eq!(resolve_category(&d, "ng"), expected);
    }

    #[rstest]
    #[case("https://x.com/images/3/iris.jpg", false, "iris.jpg")]
    #[case("https://x.com/images/3/iris%20bleu.jpg", false, "iris bleu.jpg")]
    #[case("https://x.com/images/3/iris.jpg", true, "preview_iris.jpg")]
    #[case("https://x.com/images/3/", false, "image_1714559400.jpg")]
    #[case("https://x.com/images/3/%2E%2E", false, "image_1714559400.jpg")]
    fn test_filename_for(#[case] url: &str, #[case] preview: bool, #[case] expected: &str) {
        let now = datetime!(2024-05-01 10:30:00 UTC);
        assert_eq!(filename_for(&Url::parse(url).unwrap(), preview, now), expected);
    }
}
