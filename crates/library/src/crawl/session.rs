use galerie_extract::models::ImageRecord;
use galerie_storage::DuplicateTracker;
use std::collections::{BTreeSet, HashSet};
use url::Url;

/// Mutable state of one crawl. Discarded when the crawl ends; only
/// [`records`](Self::records) outlives it, through the metadata file.
#[derive(Debug, Default)]
pub struct Session {
    /// Pages processed so far, across all categories.
    pub visited_urls: HashSet<Url>,
    /// Every URL known to be downloaded, including by earlier runs.
    pub tracker: DuplicateTracker,
    /// The collection persisted to this run's metadata file.
    pub records: Vec<ImageRecord>,
    /// Category slugs that received at least one image in this session.
    pub categories_found: BTreeSet<String>,
    pub new_images: usize,
}

impl Session {
    pub fn new(tracker: DuplicateTracker, records: Vec<ImageRecord>) -> Self {
        Self { tracker, records, ..Self::default() }
    }

    /// Mark `url` as visited. Returns `false` if it already was.
    pub fn visit(&mut self, url: &Url) -> bool {
        self.visited_urls.insert(url.clone())
    }

    pub fn is_visited(&self, url: &Url) -> bool {
        self.visited_urls.contains(url)
    }

    pub fn add(&mut self, record: ImageRecord) {
        self.categories_found.insert(record.category.clone());
        self.records.push(record);
        self.new_images += 1;
    }
}
