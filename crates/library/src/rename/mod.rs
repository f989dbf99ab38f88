//! Batch renaming of downloaded images.
//!
//! Files are renamed to `<title>_<last three digits>.<ext>` and moved into
//! the folder of their cleaned category. Everything is driven by the
//! metadata files: a record's `local_path` says where the file is, and a
//! live pass rewrites `filename`, `local_path` and `category` to match the
//! new location.
//!
//! The primary entry point is [`rename_all`], which finds every metadata file
//! under an assets root and passes each to [`rename_collection`], which in
//! turn hands each record to [`rename_record`].

mod batch;
pub mod error;
mod file;
mod naming;

pub use self::batch::{RenameReport, rename_all, rename_collection};
pub use self::file::{Action, Mode, rename_record};
pub use self::naming::{category_dir, last_three_digits, new_filename, title_slug};
