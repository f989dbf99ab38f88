//! Lightbox caption parsing.
//!
//! Captions on the gallery look like
//! `<b>Le Jardin</b><br>Huile sur toile 40 x5 0 cm`: a bold title, a line
//! break, then the medium with the dimensions run into it.

use crate::consts;
use crate::text::clean_text;
use scraper::Html;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caption {
    pub title: String,
    pub painting_type: String,
    /// Compact, lowercase form such as `40x50cm`; empty when absent.
    pub dimensions: String,
}

/// Repair digits split by a wrapped line: `40 x5 0` becomes `40 x50`.
pub fn fix_dimension_spacing(s: &str) -> String {
    let once = consts::SPLIT_DIGITS_REGEX.replace_all(s, "x${1}${2}");
    consts::SPACED_SPLIT_DIGITS_REGEX.replace_all(&once, "x${1}${2}").into_owned()
}

/// Split the descriptive line into `(painting_type, dimensions)`.
pub fn split_dimensions(info: &str) -> (String, String) {
    let info = fix_dimension_spacing(&clean_text(info));
    match consts::DIMENSIONS_REGEX.find(&info) {
        Some(found) => {
            let dimensions: String =
                found.as_str().chars().filter(|c| !c.is_whitespace()).collect::<String>().to_lowercase();
            let remainder = format!("{}{}", &info[..found.start()], &info[found.end()..]);
            (clean_text(&remainder), dimensions)
        },
        None => (info, String::new()),
    }
}

/// Parse the inner HTML of the caption element.
pub fn parse_caption(inner_html: &str) -> Caption {
    let fragment = Html::parse_fragment(inner_html);
    let title = fragment
        .select(&consts::CAPTION_TITLE_SELECTOR)
        .next()
        .map(|b| clean_text(&b.text().collect::<String>()))
        .unwrap_or_default();
    let (painting_type, dimensions) = match consts::LINE_BREAK_REGEX.split(inner_html).nth(1) {
        Some(info) => split_dimensions(info),
        None => (String::new(), String::new()),
    };
    Caption { title, painting_type, dimensions }
}
