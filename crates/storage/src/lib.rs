mod dedup;
pub mod error;
mod files;
mod layout;
mod metadata;
mod naming;
mod path;

pub use crate::dedup::{Claim, DuplicateTracker};
pub use crate::files::{relocate, remove_empty_dirs, write_unique};
pub use crate::layout::{DEBUG_LOG_FILE, IMAGES_DIR, METADATA_FILE, RUNS_DIR, RunLayout};
pub use crate::metadata::{MetadataStore, discover_metadata_files};
pub use crate::naming::{split_extension, with_conflict, with_counter};
pub use crate::path::{sanitize_filename, validate as validate_path};
