//! Target names for renamed files.

use galerie_storage::{IMAGES_DIR, split_extension};
use rslug::slugify;
use std::path::{Component, Path, PathBuf};

const MAX_TITLE_BYTES: usize = 50;
const DEFAULT_EXTENSION: &str = ".jpg";
const UNTITLED: &str = "untitled";

/// Quotation marks and apostrophes, which separate words like any other
/// punctuation: '"''""„"`«»
const QUOTES: [char; 13] = [
    '\u{0027}', '\u{0022}', '\u{2018}', '\u{2019}', '\u{201C}', '\u{201D}', '\u{201E}', '\u{201B}', '\u{0060}',
    '\u{00AB}', '\u{00BB}', '\u{2039}', '\u{203A}',
];

/// Every digit in the stem, concatenated; the last three of them,
/// left-padded with zeros.
///
/// ```
/// use galerie_library::rename::last_three_digits;
/// assert_eq!(last_three_digits("photo001.jpg"), "001");
/// assert_eq!(last_three_digits("a1b2.png"), "012");
/// assert_eq!(last_three_digits("img.jpg"), "000");
/// ```
pub fn last_three_digits(filename: &str) -> String {
    let (stem, _) = split_extension(filename);
    let digits: Vec<char> = stem.chars().filter(char::is_ascii_digit).collect();
    let tail: String = digits[digits.len().saturating_sub(3)..].iter().collect();
    format!("{tail:0>3}")
}

/// ASCII, underscore-separated, at most 50 bytes; `untitled` when nothing
/// is left.
pub fn title_slug(title: &str) -> String {
    let spaced: String = title.chars().map(|c| if QUOTES.contains(&c) { ' ' } else { c }).collect();
    let slug = slugify!(&spaced).replace('-', "_");
    let truncated = slug[..slug.floor_char_boundary(MAX_TITLE_BYTES)].trim_matches('_');
    match truncated.is_empty() {
        true => UNTITLED.to_string(),
        false => truncated.to_string(),
    }
}

/// `<title slug>_<last three digits><extension>`, keeping the current
/// extension (`.jpg` if there is none).
pub fn new_filename(title: &str, current: &str) -> String {
    let (_, ext) = split_extension(current);
    let ext = if ext.is_empty() { DEFAULT_EXTENSION } else { ext };
    format!("{}_{}{}", title_slug(title), last_three_digits(current), ext)
}

/// The directory a file should live in once its category is `category`:
/// the component right after `images` is swapped out. Paths without an
/// `images` component (or with nothing after it) keep their directory.
pub fn category_dir(local_path: &Path, category: &str) -> PathBuf {
    let parent = local_path.parent().unwrap_or_else(|| Path::new(""));
    let components: Vec<Component<'_>> = parent.components().collect();
    let Some(idx) = components.iter().position(|c| c.as_os_str() == IMAGES_DIR) else {
        return parent.to_path_buf();
    };
    if idx + 1 >= components.len() {
        return parent.to_path_buf();
    }
    let mut dir: PathBuf = components[..=idx].iter().collect();
    dir.push(category);
    dir.extend(&components[idx + 2..]);
    dir
}
