use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use time::OffsetDateTime;

/// One downloaded image, as persisted in `metadata.json`.
///
/// `original_url` is the identity of a record: a collection never holds two
/// records for the same URL. The crawler creates records; only the renamer
/// changes them afterwards (`filename`, `local_path`, `category`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub filename: String,
    pub original_url: String,
    pub local_path: PathBuf,
    pub file_size: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub downloaded_at: OffsetDateTime,
    pub source_page: String,
    #[serde(default)]
    pub page_title: String,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub painting_type: String,
    #[serde(default)]
    pub dimensions: String,
    pub category: String,
    #[serde(default)]
    pub crawl_run: String,
    #[serde(default)]
    pub is_preview: bool,
}
