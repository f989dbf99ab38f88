//! On-disk layout of a crawl run.
//!
//! ```text
//! <root>/
//! ├── images/<category-slug>/<filename>
//! ├── metadata.json
//! └── debug_log.txt
//! ```

use crate::error::{ErrorKind, Result};
use crate::path::validate as validate_path;
use exn::ResultExt;
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::macros::format_description;

pub const IMAGES_DIR: &str = "images";
pub const METADATA_FILE: &str = "metadata.json";
pub const DEBUG_LOG_FILE: &str = "debug_log.txt";
pub const RUNS_DIR: &str = "crawl_runs";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunLayout {
    root: PathBuf,
}

impl RunLayout {
    /// A fresh run directory `<assets>/crawl_runs/run_YYYYmmdd_HHMMSS`.
    pub fn timestamped(assets: impl AsRef<Path>, now: OffsetDateTime) -> Result<Self> {
        let stamp = now
            .format(format_description!("[year][month][day]_[hour][minute][second]"))
            .or_raise(|| ErrorKind::InvalidPath(assets.as_ref().to_path_buf()))?;
        Ok(Self { root: assets.as_ref().join(RUNS_DIR).join(format!("run_{stamp}")) })
    }

    /// Write straight into `assets`, sharing its metadata across runs.
    pub fn fixed(assets: impl AsRef<Path>) -> Self {
        Self { root: assets.as_ref().to_path_buf() }
    }

    /// Create the run root and its `images/` directory.
    pub async fn create(&self) -> Result<()> {
        let images = self.images_dir();
        tokio::fs::create_dir_all(&images).await.map_err(|e| ErrorKind::from_io(e, &images))?;
        tracing::debug!(root = %self.root.display(), "Created run directory");
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join(IMAGES_DIR)
    }

    pub fn metadata_path(&self) -> PathBuf {
        self.root.join(METADATA_FILE)
    }

    pub fn debug_log_path(&self) -> PathBuf {
        self.root.join(DEBUG_LOG_FILE)
    }

    /// Identifier stored in each record's `crawl_run`.
    pub fn run_id(&self) -> String {
        self.root.display().to_string()
    }

    /// Folder for one category slug. Slugs that would escape `images/`
    /// are rejected.
    pub fn category_dir(&self, slug: &str) -> Result<PathBuf> {
        Ok(self.images_dir().join(validate_path(slug)?))
    }
}
