pub mod crawl;
pub mod download;
pub mod error;
pub mod rename;
pub mod stats;

pub use crate::crawl::{CategoryLimit, CrawlOptions, Crawler, Session, Summary};
pub use crate::download::Downloader;
pub use crate::stats::CollectionStats;
