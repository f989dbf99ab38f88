//! Filename variants used when a target name is already taken.

/// Split `name` into stem and extension (extension keeps its dot).
///
/// A leading dot is part of the stem, so `.jpg` has no extension.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(0) | None => (name, ""),
        Some(idx) => name.split_at(idx),
    }
}

/// `iris.jpg` → `iris_2.jpg`. Used when downloading into a folder that
/// already holds a different file of the same name.
pub fn with_counter(name: &str, n: usize) -> String {
    let (stem, ext) = split_extension(name);
    format!("{stem}_{n}{ext}")
}

/// `iris.jpg` → `iris_conflict_1.jpg`. Used by the renamer.
pub fn with_conflict(name: &str, n: usize) -> String {
    let (stem, ext) = split_extension(name);
    format!("{stem}_conflict_{n}{ext}")
}
