//! Path validation and filename sanitization.
//!
//! Category slugs and filenames come from a remote site, so anything joined
//! onto the run directory goes through here first.

use crate::error::{ErrorKind, Result};
use std::path::{Component, Path, PathBuf};

/// Validates a path relative to some root, resolving `.` and `..` without
/// ever leaving that root. Null bytes, absolute prefixes and empty results
/// are rejected with [`InvalidPath`](crate::error::ErrorKind::InvalidPath).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use galerie_storage::validate_path;
/// assert!(validate_path("fleurs/iris.jpg").is_ok());
/// assert!(validate_path("fleurs/../../etc/passwd").is_err());
/// assert_eq!(validate_path("fleurs/./iris.jpg/").unwrap(), Path::new("fleurs/iris.jpg"));
/// ```
pub fn validate(path: impl AsRef<Path>) -> Result<PathBuf> {
    let path = path.as_ref();
    let mut components = Vec::new();
    for component in path.components() {
        match component {
            Component::Normal(s) => {
                // Null bytes survive Path::components() on Unix but truncate in syscalls.
                if s.as_encoded_bytes().contains(&0) {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
                components.push(s)
            },
            Component::CurDir | Component::RootDir => {},
            Component::Prefix(_) => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
            Component::ParentDir => {
                if components.pop().is_none() {
                    exn::bail!(ErrorKind::InvalidPath(path.to_path_buf()));
                }
            },
        }
    }
    match components.is_empty() {
        true => exn::bail!(ErrorKind::InvalidPath(path.to_path_buf())),
        false => Ok(components.into_iter().collect()),
    }
}

/// Make a single path component out of an arbitrary remote filename.
///
/// Separators and control characters become `_`, leading dots are dropped so
/// nothing turns into a hidden file, and the result is capped at 200 bytes
/// (on a character boundary, keeping the extension). Returns `None` when
/// nothing usable is left.
pub fn sanitize_filename(name: &str) -> Option<String> {
    const MAX_BYTES: usize = 200;
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').trim();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '_') {
        return None;
    }
    if cleaned.len() <= MAX_BYTES {
        return Some(cleaned.to_string());
    }
    let (stem, ext) = crate::naming::split_extension(cleaned);
    let keep = MAX_BYTES.saturating_sub(ext.len());
    Some(format!("{}{}", &stem[..stem.floor_char_boundary(keep)], ext))
}
