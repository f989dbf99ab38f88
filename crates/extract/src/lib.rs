mod caption;
mod classify;
mod consts;
pub mod error;
mod gallery;
mod links;
pub mod models;
mod page;
mod pagination;
mod text;
#[cfg(test)]
mod testing;

pub use crate::caption::{Caption, fix_dimension_spacing, parse_caption, split_dimensions};
pub use crate::classify::{
    extract_category, extract_param, is_gallery_image, normalize_url, resolve_asset, resolve_link,
    slideshow_full_resolution, slugify_category,
};
pub use crate::consts::MISCELLANEOUS;
pub use crate::gallery::{
    discover_categories, discover_gallery, filter_categories, select_categories, select_gallery,
};
pub use crate::links::Anchor;
pub use crate::page::PageExtractor;
pub use crate::pagination::{discover_pagination, select_pagination};
pub use crate::text::{clean_text, collapse_whitespace, fold_diacritics};
