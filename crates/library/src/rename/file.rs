use crate::rename::error::{ErrorKind, Result};
use crate::rename::naming::{category_dir, new_filename};
use exn::ResultExt;
use galerie_extract::models::ImageRecord;
use galerie_extract::slugify_category;
use galerie_storage::relocate;
use std::path::{Path, PathBuf};

/// Whether a rename pass may touch the disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Report what would happen; change nothing.
    #[default]
    DryRun,
    Live,
}

/// The outcome of (successfully) renaming a single record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// File was moved and its record updated.
    Renamed { from: PathBuf, to: PathBuf },
    /// Dry run: the file would be moved here. The final name may still get a
    /// `_conflict_N` suffix.
    Planned { from: PathBuf, to: PathBuf },
    /// Filename and category are already clean.
    AlreadyCorrect(PathBuf),
}

/// Give one record's file its clean name and category folder.
///
/// In [`Mode::Live`] the file is moved (never over another file) and
/// `filename`, `local_path` and `category` are updated in place. In
/// [`Mode::DryRun`] neither the disk nor `record` change.
pub async fn rename_record(record: &mut ImageRecord, mode: Mode) -> Result<Action> {
    let from = record.local_path.clone();
    let present = !record.filename.is_empty()
        && !from.as_os_str().is_empty()
        && tokio::fs::try_exists(&from).await.unwrap_or(false);
    if !present {
        exn::bail!(ErrorKind::MissingFile(from));
    }

    let filename = new_filename(&record.title, &record.filename);
    let category = slugify_category(&record.category);
    if filename == record.filename && category == record.category {
        return Ok(Action::AlreadyCorrect(from));
    }
    let dir = match category == record.category {
        true => from.parent().unwrap_or_else(|| Path::new("")).to_path_buf(),
        false => category_dir(&from, &category),
    };

    match mode {
        Mode::DryRun => Ok(Action::Planned { to: dir.join(&filename), from }),
        Mode::Live => {
            let to = relocate(&from, &dir, &filename).await.or_raise(|| ErrorKind::Move(from.clone()))?;
            record.filename = to.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or(filename);
            record.local_path = to.clone();
            record.category = category;
            Ok(Action::Renamed { from, to })
        },
    }
}
