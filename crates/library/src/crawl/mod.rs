//! Category-aware crawling.
//!
//! The [`Crawler`] walks a gallery site in three stages: find the gallery
//! page from the start URL, list the categories it links to, then exhaust
//! each category with a breadth-first walk over its pagination links. Every
//! page is handled on one browser tab, strictly in sequence.
//!
//! Failures below the orchestration level never abort a crawl: a page that
//! will not load counts as empty, an image that will not download is skipped
//! and a metadata save that fails is retried with the next one.

mod category;
pub mod error;
mod session;

pub use self::session::Session;
use self::error::{ErrorKind, Result};
use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use exn::ResultExt;
use galerie_client::{Browser, Fetcher, Page};
use galerie_config::Config;
use galerie_extract::models::Category;
use galerie_extract::{discover_categories, discover_gallery, filter_categories, normalize_url};
use galerie_storage::{DuplicateTracker, MetadataStore, RunLayout, discover_metadata_files};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::instrument;
use url::Url;

/// How many of the discovered categories to crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryLimit {
    #[default]
    All,
    First(usize),
}

#[derive(Debug, Clone, Default)]
pub struct CrawlOptions {
    pub limit: CategoryLimit,
    /// Only crawl categories whose name or link text contains this.
    pub only: Option<String>,
}

/// What a finished (or cancelled) crawl did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub pages_visited: usize,
    pub categories_processed: usize,
    pub new_images: usize,
    pub total_images: usize,
    pub categories_found: Vec<String>,
    pub run_dir: PathBuf,
    pub cancelled: bool,
}

pub struct Crawler<'a, B, F> {
    browser: &'a B,
    fetcher: &'a F,
    config: &'a Config,
    layout: &'a RunLayout,
    store: MetadataStore,
    cancel: CancellationToken,
}

impl<'a, B: Browser, F: Fetcher> Crawler<'a, B, F> {
    pub fn new(browser: &'a B, fetcher: &'a F, config: &'a Config, layout: &'a RunLayout) -> Self {
        Self {
            browser,
            fetcher,
            config,
            layout,
            store: MetadataStore::new(layout.metadata_path()),
            cancel: CancellationToken::new(),
        }
    }

    /// Stop at the next page or image boundary once `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Load what earlier runs left behind: every URL recorded anywhere under
    /// the assets root counts as downloaded, and this run's own metadata file
    /// (if it already exists) seeds the collection.
    pub async fn prepare_session(&self) -> LibraryResult<Session> {
        self.prepare_session_inner().await.or_raise(|| LibraryErrorKind::Crawl)
    }

    async fn prepare_session_inner(&self) -> Result<Session> {
        let own = self.store.load().await.or_raise(|| ErrorKind::Metadata)?;
        let tracker = DuplicateTracker::load(&own);
        let files = discover_metadata_files(&self.config.output.assets).await.or_raise(|| ErrorKind::Metadata)?;
        for path in files.into_iter().filter(|p| p != self.store.path()) {
            match MetadataStore::new(&path).load().await {
                Ok(records) => records.iter().for_each(|r| tracker.mark(r.original_url.as_str())),
                Err(err) => tracing::warn!(path = %path.display(), error = ?err, "Ignoring unreadable metadata"),
            }
        }
        tracing::info!(known = tracker.len(), existing = own.len(), "Prepared crawl session");
        Ok(Session::new(tracker, own))
    }

    /// Crawl the configured site into this run's layout.
    ///
    /// # Errors
    /// Only when no tab can be opened or the start page cannot be loaded.
    #[instrument(skip_all, fields(start = %self.config.site.start_url))]
    pub async fn run(&self, session: &mut Session, options: &CrawlOptions) -> LibraryResult<Summary> {
        let page = self.browser.new_page().await.or_raise(|| ErrorKind::Browser).or_raise(|| LibraryErrorKind::Crawl)?;
        let outcome = self.run_on(&page, session, options).await;
        if let Err(err) = page.close().await {
            tracing::debug!(error = ?err, "Unable to close tab");
        }
        self.save(session).await;
        let categories_processed = outcome.or_raise(|| LibraryErrorKind::Crawl)?;

        let summary = Summary {
            pages_visited: session.visited_urls.len(),
            categories_processed,
            new_images: session.new_images,
            total_images: session.records.len(),
            categories_found: session.categories_found.iter().cloned().collect(),
            run_dir: self.layout.root().to_path_buf(),
            cancelled: self.cancel.is_cancelled(),
        };
        tracing::info!(
            pages = summary.pages_visited,
            categories = summary.categories_processed,
            new_images = summary.new_images,
            total_images = summary.total_images,
            "Crawl finished"
        );
        Ok(summary)
    }

    /// Returns the number of categories processed.
    async fn run_on(&self, page: &B::Page, session: &mut Session, options: &CrawlOptions) -> Result<usize> {
        let site = &self.config.site;
        let start = normalize_url(&site.start_url);
        self.load(page, &start).await?;
        session.visit(&start);

        let Some(gallery) = discover_gallery(page, &start, site)
            .await
            .or_raise(|| ErrorKind::Extract(start.to_string()))?
        else {
            tracing::warn!("No gallery page found; nothing to crawl");
            return Ok(0);
        };
        if let Err(err) = self.load(page, &gallery).await {
            tracing::warn!(gallery = %gallery, error = ?err, "Gallery page failed to load");
            return Ok(0);
        }
        let categories = match discover_categories(page, &gallery, site).await {
            Ok(categories) => self.select(categories, options),
            Err(err) => {
                tracing::warn!(error = ?err, "Unable to read gallery categories");
                Vec::new()
            },
        };

        if categories.is_empty() {
            tracing::info!(gallery = %gallery, "No categories found; crawling gallery page only");
            if session.visit(&gallery) {
                // Already loaded above.
                self.process_loaded(page, session, &gallery).await;
            }
            return Ok(0);
        }

        let mut processed = 0;
        for (idx, category) in categories.iter().enumerate() {
            if idx > 0 && !self.pause(self.config.crawl.request_delay() * 2).await {
                break;
            }
            if self.cancel.is_cancelled() {
                break;
            }
            self.crawl_category(page, session, category).await;
            processed += 1;
        }
        Ok(processed)
    }

    fn select(&self, categories: Vec<Category>, options: &CrawlOptions) -> Vec<Category> {
        let found = categories.len();
        let mut categories = match &options.only {
            Some(needle) => filter_categories(categories, needle),
            None => categories,
        };
        if let CategoryLimit::First(n) = options.limit {
            categories.truncate(n);
        }
        tracing::info!(found, selected = categories.len(), "Selected categories");
        categories
    }

    /// Navigate and give client-side scripts time to settle.
    async fn load(&self, page: &B::Page, url: &Url) -> Result<()> {
        page.navigate(url.as_str(), self.config.crawl.navigation_timeout())
            .await
            .or_raise(|| ErrorKind::Navigation(url.to_string()))?;
        tokio::time::sleep(self.config.crawl.settle()).await;
        Ok(())
    }

    /// Persist the collection. Failures are logged only; the next save
    /// rewrites everything.
    async fn save(&self, session: &Session) {
        if let Err(err) = self.store.save(&session.records).await {
            tracing::warn!(error = ?err, "Unable to save metadata; keeping records in memory");
        }
    }

    /// Sleep unless cancelled first. Returns `false` on cancellation.
    async fn pause(&self, duration: Duration) -> bool {
        if duration.is_zero() {
            return !self.cancel.is_cancelled();
        }
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(duration) => true,
        }
    }
}
