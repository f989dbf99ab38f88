use super::{Crawler, Session};
use crate::download::Downloader;
use galerie_client::{Browser, Fetcher};
use galerie_extract::models::Category;
use galerie_extract::{PageExtractor, discover_pagination, normalize_url};
use std::collections::{HashSet, VecDeque};
use tracing::instrument;
use url::Url;

impl<B: Browser, F: Fetcher> Crawler<'_, B, F> {
    /// Breadth-first walk over one category's pages, starting from its first
    /// page. Metadata is saved after every page. Returns the number of
    /// images downloaded.
    #[instrument(skip_all, fields(category = %category.name, id = %category.value))]
    pub(super) async fn crawl_category(&self, page: &B::Page, session: &mut Session, category: &Category) -> usize {
        let before = session.new_images;
        let mut queue = VecDeque::from([normalize_url(&category.url)]);
        let mut seen = HashSet::new();

        while let Some(url) = queue.pop_front() {
            if self.cancel.is_cancelled() {
                break;
            }
            if !seen.insert(url.clone()) {
                continue;
            }
            if !session.visit(&url) {
                tracing::debug!(url = %url, "Already crawled in this session");
                continue;
            }

            let links = match self.load(page, &url).await {
                Ok(()) => self.process_loaded(page, session, &url).await,
                Err(err) => {
                    tracing::warn!(url = %url, error = ?err, "Page failed to load; skipping");
                    Vec::new()
                },
            };
            for link in links {
                if seen.contains(&link) || session.is_visited(&link) || !self.is_allowed(&link) {
                    continue;
                }
                tracing::debug!(url = %link, "Queued page");
                queue.push_back(link);
            }

            self.save(session).await;
            if !self.pause(self.config.crawl.request_delay()).await {
                break;
            }
        }

        let downloaded = session.new_images - before;
        tracing::info!(images = downloaded, "Category done");
        downloaded
    }

    /// Download every image on the page currently showing `url`, and return
    /// its pagination links. Extraction failures leave the page empty.
    pub(super) async fn process_loaded(&self, page: &B::Page, session: &mut Session, url: &Url) -> Vec<Url> {
        let descriptors = match PageExtractor::new(self.config).extract(page, url).await {
            Ok(descriptors) => descriptors,
            Err(err) => {
                tracing::warn!(url = %url, error = ?err, "Unable to extract images");
                Vec::new()
            },
        };
        let links = match discover_pagination(page, url, &self.config.site).await {
            Ok(links) => links,
            Err(err) => {
                tracing::warn!(url = %url, error = ?err, "Unable to read pagination");
                Vec::new()
            },
        };

        let downloader = Downloader::new(self.fetcher, self.config, self.layout);
        for descriptor in &descriptors {
            if self.cancel.is_cancelled() {
                break;
            }
            match downloader.download(descriptor, &session.tracker).await {
                Ok(record) => {
                    session.add(record);
                    if !self.pause(self.config.crawl.request_delay()).await {
                        break;
                    }
                },
                Err(err) if err.is_rejection() => tracing::debug!(url = %descriptor.url, error = ?err, "Skipped"),
                Err(err) => tracing::warn!(url = %descriptor.url, error = ?err, "Download failed"),
            }
        }
        links
    }

    fn is_allowed(&self, url: &Url) -> bool {
        url.host_str().is_some_and(|host| self.config.is_allowed_host(host))
    }
}
