//! Duplicate tracking across a crawl session.
//!
//! A URL is either downloaded (committed), pending (claimed by an in-flight
//! download) or unknown. [`DuplicateTracker::claim`] moves unknown → pending
//! under one lock, so two concurrent attempts on the same URL can never both
//! proceed. [`Claim::commit`] moves pending → downloaded; dropping the claim
//! without committing returns the URL to unknown.

use galerie_extract::models::ImageRecord;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct TrackerState {
    downloaded: HashSet<String>,
    pending: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct DuplicateTracker {
    state: Mutex<TrackerState>,
}

impl DuplicateTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from previously persisted records.
    pub fn load<'a>(records: impl IntoIterator<Item = &'a ImageRecord>) -> Self {
        let downloaded = records.into_iter().map(|r| r.original_url.clone()).collect();
        Self { state: Mutex::new(TrackerState { downloaded, pending: HashSet::new() }) }
    }

    // The sets stay consistent even if a holder panicked.
    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Downloaded or currently claimed.
    pub fn is_duplicate(&self, url: &str) -> bool {
        let state = self.lock();
        state.downloaded.contains(url) || state.pending.contains(url)
    }

    pub fn mark(&self, url: impl Into<String>) {
        let url = url.into();
        let mut state = self.lock();
        state.pending.remove(&url);
        state.downloaded.insert(url);
    }

    /// Reserve `url` for download, or `None` if it is already downloaded or
    /// claimed elsewhere.
    pub fn claim(&self, url: &str) -> Option<Claim<'_>> {
        let mut state = self.lock();
        if state.downloaded.contains(url) || !state.pending.insert(url.to_string()) {
            return None;
        }
        Some(Claim { tracker: self, url: url.to_string(), committed: false })
    }

    /// Number of committed URLs.
    pub fn len(&self) -> usize {
        self.lock().downloaded.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A pending reservation returned by [`DuplicateTracker::claim`].
#[derive(Debug)]
#[must_use = "dropping a claim releases the reservation"]
pub struct Claim<'a> {
    tracker: &'a DuplicateTracker,
    url: String,
    committed: bool,
}

impl Claim<'_> {
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Record the URL as downloaded. Call only after the file is written.
    pub fn commit(mut self) {
        self.tracker.mark(self.url.as_str());
        self.committed = true;
    }
}

impl Drop for Claim<'_> {
    fn drop(&mut self) {
        if !self.committed {
            self.tracker.lock().pending.remove(&self.url);
        }
    }
}
