//! Persisted record collections.
//!
//! A metadata file is a pretty-printed JSON array of [`ImageRecord`]s,
//! rewritten wholesale on every save. Saves go through a temporary file in
//! the same directory followed by a rename, so readers never observe a
//! half-written collection.

use crate::error::{ErrorKind, Result};
use crate::layout::{METADATA_FILE, RUNS_DIR};
use exn::ResultExt;
use galerie_extract::models::ImageRecord;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::instrument;

#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the collection. A missing file is an empty collection.
    #[instrument(skip_all, fields(path = %self.path.display()))]
    pub async fn load(&self) -> Result<Vec<ImageRecord>> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => exn::bail!(ErrorKind::from_io(e, &self.path)),
        };
        let records: Vec<ImageRecord> =
            serde_json::from_slice(&bytes).or_raise(|| ErrorKind::Corrupt(self.path.clone()))?;
        tracing::debug!(records = records.len(), "Loaded metadata");
        Ok(records)
    }

    /// Replace the persisted collection with `records`.
    ///
    /// On failure the previous file is left as it was.
    #[instrument(skip_all, fields(path = %self.path.display(), records = records.len()))]
    pub async fn save(&self, records: &[ImageRecord]) -> Result<()> {
        let json = serde_json::to_vec_pretty(records).or_raise(|| ErrorKind::Persist(self.path.clone()))?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomic(&path, &json))
            .await
            .or_raise(|| ErrorKind::Persist(self.path.clone()))??;
        tracing::debug!("Saved metadata");
        Ok(())
    }
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(parent).map_err(|e| ErrorKind::from_io(e, parent))?;
    let mut temp = tempfile::NamedTempFile::new_in(parent).or_raise(|| ErrorKind::Persist(path.to_path_buf()))?;
    temp.write_all(contents).or_raise(|| ErrorKind::Persist(path.to_path_buf()))?;
    temp.as_file().sync_all().or_raise(|| ErrorKind::Persist(path.to_path_buf()))?;
    temp.persist(path).map_err(|e| e.error).or_raise(|| ErrorKind::Persist(path.to_path_buf()))?;
    Ok(())
}

/// Every metadata file under an assets root: the shared `metadata.json`
/// first (if present), then one per timestamped run in name order.
pub async fn discover_metadata_files(assets: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let assets = assets.as_ref();
    let mut found = Vec::new();
    let shared = assets.join(METADATA_FILE);
    if fs::try_exists(&shared).await.map_err(|e| ErrorKind::from_io(e, &shared))? {
        found.push(shared);
    }

    let runs_dir = assets.join(RUNS_DIR);
    let mut entries = match fs::read_dir(&runs_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(found),
        Err(e) => exn::bail!(ErrorKind::from_io(e, &runs_dir)),
    };
    let mut runs = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| ErrorKind::from_io(e, &runs_dir))? {
        let candidate = entry.path().join(METADATA_FILE);
        if fs::try_exists(&candidate).await.unwrap_or(false) {
            runs.push(candidate);
        }
    }
    runs.sort();
    found.extend(runs);
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    fn record(url: &str) -> ImageRecord {
        ImageRecord {
            filename: "iris.jpg".to_string(),
            original_url: url.to_string(),
            local_path: PathBuf::from("assets/images/fleurs/iris.jpg"),
            file_size: 2048,
            downloaded_at: OffsetDateTime::UNIX_EPOCH,
            source_page: "https://x.com/default.asp?ng=Fleurs".to_string(),
            page_title: "Fleurs".to_string(),
            alt_text: String::new(),
            title: "Iris bleus".to_string(),
            painting_type: "Huile sur toile".to_string(),
            dimensions: "40x50cm".to_string(),
            category: "fleurs".to_string(),
            crawl_run: "assets".to_string(),
            is_preview: false,
        }
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::new(temp_dir.path().join("metadata.json"));
        assert!(store.load().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::new(temp_dir.path().join("run/metadata.json"));
        let records = vec![record("https://x.com/images/1/a.jpg"), record("https://x.com/images/1/b.jpg")];
        store.save(&records).await.unwrap();
        assert_eq!(store.load().await.unwrap(), records);

        let raw = std::fs::read_to_string(store.path()).unwrap();
        assert!(raw.starts_with("[\n"), "metadata should be pretty-printed");
    }

    #[tokio::test]
    async fn test_save_replaces_wholesale() {
        let temp_dir = tempfile::tempdir().unwrap();
        let store = MetadataStore::new(temp_dir.path().join("metadata.json"));
        store.save(&[record("https://x.com/images/1/a.jpg"), record("https://x.com/images/1/b.jpg")]).await.unwrap();
        store.save(&[record("https://x.com/images/1/c.jpg")]).await.unwrap();
        let loaded = store.load().await.unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].original_url, "https://x.com/images/1/c.jpg");
        // No temp files left behind.
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("metadata.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = MetadataStore::new(&path).load().await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Corrupt(p) if p == &path));
    }

    #[tokio::test]
    async fn test_discover_metadata_files() {
        let temp_dir = tempfile::tempdir().unwrap();
        let assets = temp_dir.path();
        for dir in ["crawl_runs/run_20240102_000000", "crawl_runs/run_20240101_000000", "crawl_runs/empty"] {
            std::fs::create_dir_all(assets.join(dir)).unwrap();
        }
        std::fs::write(assets.join("metadata.json"), "[]").unwrap();
        std::fs::write(assets.join("crawl_runs/run_20240102_000000/metadata.json"), "[]").unwrap();
        std::fs::write(assets.join("crawl_runs/run_20240101_000000/metadata.json"), "[]").unwrap();

        let found = discover_metadata_files(assets).await.unwrap();
        assert_eq!(
            found,
            vec![
                assets.join("metadata.json"),
                assets.join("crawl_runs/run_20240101_000000/metadata.json"),
                assets.join("crawl_runs/run_20240102_000000/metadata.json"),
            ]
        );
    }

    #[tokio::test]
    async fn test_discover_without_runs() {
        let temp_dir = tempfile::tempdir().unwrap();
        assert!(discover_metadata_files(temp_dir.path()).await.unwrap().is_empty());
    }
}
