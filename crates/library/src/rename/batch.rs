use crate::error::{ErrorKind as LibraryErrorKind, Result as LibraryResult};
use crate::rename::error::{ErrorKind, Result};
use crate::rename::file::{Action, Mode, rename_record};
use exn::ResultExt;
use galerie_storage::{IMAGES_DIR, MetadataStore, discover_metadata_files, remove_empty_dirs};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::instrument;

/// What a rename pass did to one metadata file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenameReport {
    pub metadata_file: PathBuf,
    pub processed: usize,
    /// Files moved (live mode).
    pub renamed: usize,
    /// Files that would be moved (dry run).
    pub planned: usize,
    pub unchanged: usize,
    pub errors: usize,
    /// Original category → cleaned category, for every category that changes.
    pub categories_updated: BTreeMap<String, String>,
}

/// Rename every record of one metadata file.
///
/// A live pass saves the metadata file if anything moved, then removes
/// directories left empty under the sibling `images/` directory.
#[instrument(skip_all, fields(metadata = %metadata_file.display(), mode = ?mode))]
pub async fn rename_collection(metadata_file: &Path, mode: Mode) -> LibraryResult<RenameReport> {
    rename_collection_inner(metadata_file, mode).await.or_raise(|| LibraryErrorKind::Rename)
}

async fn rename_collection_inner(metadata_file: &Path, mode: Mode) -> Result<RenameReport> {
    let store = MetadataStore::new(metadata_file);
    let mut records = store.load().await.or_raise(|| ErrorKind::Metadata(metadata_file.to_path_buf()))?;
    let mut report =
        RenameReport { metadata_file: metadata_file.to_path_buf(), processed: records.len(), ..Default::default() };

    for record in records.iter_mut() {
        let category = record.category.clone();
        match rename_record(record, mode).await {
            Ok(Action::AlreadyCorrect(_)) => report.unchanged += 1,
            Ok(Action::Planned { from, to }) => {
                tracing::info!(from = %from.display(), to = %to.display(), "Would rename");
                report.planned += 1;
            },
            Ok(Action::Renamed { from, to }) => {
                tracing::info!(from = %from.display(), to = %to.display(), "Renamed");
                report.renamed += 1;
            },
            Err(err) => {
                tracing::warn!(url = %record.original_url, error = ?err, "Skipping record");
                report.errors += 1;
                continue;
            },
        }
        let cleaned = galerie_extract::slugify_category(&category);
        if cleaned != category {
            report.categories_updated.insert(category, cleaned);
        }
    }

    if mode == Mode::Live {
        if report.renamed > 0 {
            store.save(&records).await.or_raise(|| ErrorKind::Metadata(metadata_file.to_path_buf()))?;
        }
        let images = metadata_file.parent().unwrap_or_else(|| Path::new("")).join(IMAGES_DIR);
        match remove_empty_dirs(&images).await {
            Ok(removed) => tracing::debug!(removed, "Removed empty directories"),
            Err(err) => tracing::warn!(error = ?err, "Unable to clean up empty directories"),
        }
    }
    Ok(report)
}

/// Rename across every metadata file under `assets`. A file that cannot be
/// processed is reported with a single error.
pub async fn rename_all(assets: &Path, mode: Mode) -> LibraryResult<Vec<RenameReport>> {
    let files = discover_metadata_files(assets).await.or_raise(|| LibraryErrorKind::Rename)?;
    tracing::info!(files = files.len(), "Found metadata files");
    let mut reports = Vec::with_capacity(files.len());
    for file in files {
        match rename_collection(&file, mode).await {
            Ok(report) => reports.push(report),
            Err(err) => {
                tracing::warn!(metadata = %file.display(), error = ?err, "Unable to process metadata file");
                reports.push(RenameReport { metadata_file: file, errors: 1, ..Default::default() });
            },
        }
    }
    Ok(reports)
}
