//! Collection statistics.

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use galerie_extract::models::ImageRecord;
use galerie_storage::{MetadataStore, discover_metadata_files};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CollectionStats {
    pub total_images: usize,
    pub total_bytes: u64,
    /// Images per category, sorted by category.
    pub categories: BTreeMap<String, usize>,
    pub previews: usize,
    pub with_titles: usize,
    pub crawl_runs: usize,
}

impl CollectionStats {
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a ImageRecord>) -> Self {
        let mut stats = Self::default();
        let mut runs = BTreeSet::new();
        for record in records {
            stats.total_images += 1;
            stats.total_bytes += record.file_size;
            *stats.categories.entry(record.category.clone()).or_default() += 1;
            stats.previews += usize::from(record.is_preview);
            stats.with_titles += usize::from(!record.title.trim().is_empty());
            if !record.crawl_run.is_empty() {
                runs.insert(record.crawl_run.as_str());
            }
        }
        stats.crawl_runs = runs.len();
        stats
    }

    pub fn total_mib(&self) -> f64 {
        self.total_bytes as f64 / (1024.0 * 1024.0)
    }

    /// Statistics over one metadata file, or over every metadata file under
    /// `assets` when `metadata` is `None`.
    pub async fn collect(assets: &Path, metadata: Option<&Path>) -> Result<Self> {
        let files = match metadata {
            Some(path) => vec![path.to_path_buf()],
            None => discover_metadata_files(assets).await.or_raise(|| ErrorKind::Stats)?,
        };
        let mut records = Vec::new();
        for file in files {
            records.extend(MetadataStore::new(file).load().await.or_raise(|| ErrorKind::Stats)?);
        }
        Ok(Self::from_records(&records))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use time::OffsetDateTime;

    fn record(category: &str, size: u64, title: &str, run: &str, is_preview: bool) -> ImageRecord {
        ImageRecord {
            filename: "a.jpg".to_string(),
            original_url: format!("https://x.com/images/{category}/{size}.jpg"),
            local_path: PathBuf::from("a.jpg"),
            file_size: size,
            downloaded_at: OffsetDateTime::UNIX_EPOCH,
            source_page: String::new(),
            page_title: String::new(),
            alt_text: String::new(),
            title: title.to_string(),
            painting_type: String::new(),
            dimensions: String::new(),
            category: category.to_string(),
            crawl_run: run.to_string(),
            is_preview,
        }
    }

    #[test]
    fn test_from_records() {
        let records = [
            record("fleurs", 1024 * 1024, "Iris", "run_1", false),
            record("portraits", 512 * 1024, "", "run_1", true),
            record("fleurs", 512 * 1024, " ", "run_2", false),
        ];
        let stats = CollectionStats::from_records(&records);
        assert_eq!(stats.total_images, 3);
        assert_eq!(stats.total_bytes, 2 * 1024 * 1024);
        assert_eq!(stats.total_mib(), 2.0);
        assert_eq!(stats.categories.into_iter().collect::<Vec<_>>(), vec![
            ("fleurs".to_string(), 2),
            ("portraits".to_string(), 1)
        ]);
        assert_eq!(stats.previews, 1);
        assert_eq!(stats.with_titles, 1);
        assert_eq!(stats.crawl_runs, 2);
    }

    #[test]
    fn test_empty_collection() {
        let stats = CollectionStats::from_records(&Vec::<ImageRecord>::new());
        assert_eq!(stats, CollectionStats::default());
    }

    #[tokio::test]
    async fn test_collect_across_runs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let assets = temp_dir.path();
        MetadataStore::new(assets.join("metadata.json")).save(&[record("fleurs", 10, "", "a", false)]).await.unwrap();
        MetadataStore::new(assets.join("crawl_runs/run_1/metadata.json"))
            .save(&[record("portraits", 20, "", "b", false)])
            .await
            .unwrap();

        let all = CollectionStats::collect(assets, None).await.unwrap();
        assert_eq!(all.total_images, 2);
        assert_eq!(all.total_bytes, 30);

        let one = CollectionStats::collect(assets, Some(&assets.join("metadata.json"))).await.unwrap();
        assert_eq!(one.total_images, 1);
    }
}
