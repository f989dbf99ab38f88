use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

/// Folder used when nothing better is known about an image.
pub const MISCELLANEOUS: &str = "miscellaneous";

// Live-DOM selectors (handed to the browser as plain strings).
pub(crate) const GALLERY_IMAGE_CSS: &str = r#"img[src*="images/"]"#;
pub(crate) const LINK_CSS: &str = "a[href]";

// Caption fragment selectors (parsed locally with scraper).
selector!(CAPTION_TITLE_SELECTOR, "b");

regex!(GALLERY_IMAGE_REGEX, r"images/\d+/");
regex!(LINE_BREAK_REGEX, r"(?i)<br\s*/?>");
regex!(DIMENSIONS_REGEX, r"(?i)\b(\d+(?:\.\d+)?\s*x\s*\d+(?:\.\d+)?(?:\s*cm)?)\b");
// "40 x5 0" is how the site renders "40 x 50" when the caption wraps.
regex!(SPLIT_DIGITS_REGEX, r"x(\d+)\s+(\d+)");
regex!(SPACED_SPLIT_DIGITS_REGEX, r"x\s+(\d+)\s+(\d+)");
regex!(SEPARATOR_RUN_REGEX, r"[_\s]+");
regex!(HYPHEN_RUN_REGEX, r"-+");
