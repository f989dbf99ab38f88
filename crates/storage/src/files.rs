//! Collision-free file placement.

use crate::error::{ErrorKind, Result};
use crate::naming::{with_conflict, with_counter};
use exn::ResultExt;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::instrument;

const MAX_ATTEMPTS: usize = 10_000;

/// Write `bytes` to `dir/filename`, or to `stem_1.ext`, `stem_2.ext`, … if
/// that name is taken. Existing files are never overwritten; the bytes land
/// under their final name in one step. Returns the path written.
#[instrument(skip_all, fields(dir = %dir.display(), filename = %filename, size = bytes.len()))]
pub async fn write_unique(dir: &Path, filename: &str, bytes: Vec<u8>) -> Result<PathBuf> {
    fs::create_dir_all(dir).await.map_err(|e| ErrorKind::from_io(e, dir))?;
    let dir = dir.to_path_buf();
    let filename = filename.to_string();
    let target = dir.join(&filename);
    tokio::task::spawn_blocking(move || persist_unique(&dir, &filename, &bytes))
        .await
        .or_raise(|| ErrorKind::Persist(target))?
}

fn persist_unique(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    let mut temp = tempfile::NamedTempFile::new_in(dir).map_err(|e| ErrorKind::from_io(e, dir))?;
    temp.write_all(bytes).map_err(ErrorKind::Io)?;
    temp.as_file().sync_all().map_err(ErrorKind::Io)?;

    for attempt in 0..MAX_ATTEMPTS {
        let candidate = match attempt {
            0 => dir.join(filename),
            n => dir.join(with_counter(filename, n)),
        };
        match temp.persist_noclobber(&candidate) {
            Ok(_) => return Ok(candidate),
            Err(err) if err.error.kind() == std::io::ErrorKind::AlreadyExists => temp = err.file,
            Err(err) => exn::bail!(ErrorKind::from_io(err.error, candidate)),
        }
    }
    exn::bail!(ErrorKind::Exhausted(dir.join(filename)))
}

/// Move `from` into `to_dir` under `filename`, picking `stem_conflict_N.ext`
/// while the target is held by a different file. Returns the final path.
#[instrument(skip_all, fields(from = %from.display(), to = %to_dir.display()))]
pub async fn relocate(from: &Path, to_dir: &Path, filename: &str) -> Result<PathBuf> {
    if !fs::try_exists(from).await.map_err(|e| ErrorKind::from_io(e, from))? {
        exn::bail!(ErrorKind::NotFound(from.to_path_buf()));
    }
    fs::create_dir_all(to_dir).await.map_err(|e| ErrorKind::from_io(e, to_dir))?;

    let mut target = to_dir.join(filename);
    let mut conflict = 0;
    while target != from && fs::try_exists(&target).await.map_err(|e| ErrorKind::from_io(e, &target))? {
        conflict += 1;
        if conflict > MAX_ATTEMPTS {
            exn::bail!(ErrorKind::Exhausted(to_dir.join(filename)));
        }
        target = to_dir.join(with_conflict(filename, conflict));
    }
    if target != from {
        fs::rename(from, &target).await.map_err(|e| ErrorKind::from_io(e, &target))?;
    }
    Ok(target)
}

/// Remove every empty directory below `root`, deepest first. `root` itself
/// is kept. Returns how many directories were removed.
pub async fn remove_empty_dirs(root: &Path) -> Result<usize> {
    let mut dirs = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(current) = stack.pop() {
        let mut entries = match fs::read_dir(&current).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => exn::bail!(ErrorKind::from_io(e, &current)),
        };
        while let Some(entry) = entries.next_entry().await.map_err(|e| ErrorKind::from_io(e, &current))? {
            if entry.file_type().await.map_err(ErrorKind::Io)?.is_dir() {
                let path = entry.path();
                dirs.push(path.clone());
                stack.push(path);
            }
        }
    }

    // Children were pushed after their parents.
    let mut removed = 0;
    for dir in dirs.into_iter().rev() {
        let mut entries = fs::read_dir(&dir).await.map_err(|e| ErrorKind::from_io(e, &dir))?;
        if entries.next_entry().await.map_err(ErrorKind::Io)?.is_none() {
            fs::remove_dir(&dir).await.map_err(|e| ErrorKind::from_io(e, &dir))?;
            tracing::debug!(dir = %dir.display(), "Removed empty directory");
            removed += 1;
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_write_unique_creates_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path().join("images/fleurs");
        let path = write_unique(&dir, "iris.jpg", b"iris".to_vec()).await.unwrap();
        assert_eq!(path, dir.join("iris.jpg"));
        assert_eq!(std::fs::read(&path).unwrap(), b"iris");
    }

    #[tokio::test]
    async fn test_write_unique_never_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let dir = temp_dir.path();
        let first = write_unique(dir, "iris.jpg", b"one".to_vec()).await.unwrap();
        let second = write_unique(dir, "iris.jpg", b"two".to_vec()).await.unwrap();
        let third = write_unique(dir, "iris.jpg", b"three".to_vec()).await.unwrap();
        assert_eq!(first, dir.join("iris.jpg"));
        assert_eq!(second, dir.join("iris_1.jpg"));
        assert_eq!(third, dir.join("iris_2.jpg"));
        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
        assert_eq!(std::fs::read_dir(dir).unwrap().count(), 3);
    }

    #[tokio::test]
    async fn test_relocate() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        std::fs::create_dir_all(root.join("images/Fleurs")).unwrap();
        std::fs::write(root.join("images/Fleurs/123.jpg"), b"x").unwrap();

        let moved = relocate(&root.join("images/Fleurs/123.jpg"), &root.join("images/fleurs"), "iris_123.jpg")
            .await
            .unwrap();
        assert_eq!(moved, root.join("images/fleurs/iris_123.jpg"));
        assert!(moved.exists());
        assert!(!root.join("images/Fleurs/123.jpg").exists());
    }

    #[tokio::test]
    async fn test_relocate_conflicts() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path();
        std::fs::write(root.join("a.jpg"), b"a").unwrap();
        std::fs::write(root.join("b.jpg"), b"b").unwrap();
        std::fs::write(root.join("iris_001.jpg"), b"taken").unwrap();

        let first = relocate(&root.join("a.jpg"), root, "iris_001.jpg").await.unwrap();
        let second = relocate(&root.join("b.jpg"), root, "iris_001.jpg").await.unwrap();
        assert_eq!(first, root.join("iris_001_conflict_1.jpg"));
        assert_eq!(second, root.join("iris_001_conflict_2.jpg"));
        assert_eq!(std::fs::read(root.join("iris_001.jpg")).unwrap(), b"taken");
    }

    #[tokio::test]
    async fn test_relocate_onto_itself() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("iris_001.jpg");
        std::fs::write(&path, b"x").unwrap();
        assert_eq!(relocate(&path, temp_dir.path(), "iris_001.jpg").await.unwrap(), path);
    }

    #[tokio::test]
    async fn test_relocate_missing_source() {
        let temp_dir = tempfile::tempdir().unwrap();
        let err = relocate(&temp_dir.path().join("gone.jpg"), temp_dir.path(), "x.jpg").await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }

    #[tokio::test]
    async fn test_remove_empty_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let root = temp_dir.path().join("images");
        std::fs::create_dir_all(root.join("a/b/c")).unwrap();
        std::fs::create_dir_all(root.join("kept")).unwrap();
        std::fs::write(root.join("kept/iris.jpg"), b"x").unwrap();

        assert_eq!(remove_empty_dirs(&root).await.unwrap(), 3);
        assert!(root.exists());
        assert!(!root.join("a").exists());
        assert!(root.join("kept/iris.jpg").exists());
    }
}
