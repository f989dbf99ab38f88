//! Layered configuration for galerie.
//!
//! Values are merged, lowest priority first, from:
//!
//! 1. built-in defaults (the Odexpo gallery the crawler was written for),
//! 2. a configuration file (`toml`, `yaml`/`yml` or `json`, chosen by
//!    extension); either passed explicitly or `config.toml` in the platform
//!    configuration directory,
//! 3. environment variables prefixed with `GALERIE_`, using `__` to descend
//!    into sections (`GALERIE_CRAWL__REQUEST_DELAY_MS=250`).

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

pub const ENV_PREFIX: &str = "GALERIE_";
const DEFAULT_DOMAIN: &str = "fabienne-vincent.odexpo.com";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub site: SiteConfig,
    pub crawl: CrawlConfig,
    pub download: DownloadConfig,
    pub output: OutputConfig,
}

/// Where the gallery lives and how its markup is shaped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub start_url: Url,
    /// Host images and pages must belong to; `www.` is implied.
    pub allowed_domain: String,
    /// Substrings of the href identifying the link from the home page to the
    /// gallery.
    pub gallery_markers: Vec<String>,
    /// A link whose href *and* visible text both contain this word also counts
    /// as the gallery link.
    pub gallery_keyword: String,
    /// Query parameter holding the human-readable category name.
    pub category_param: String,
    /// Query parameter holding the site's opaque category id.
    pub category_id_param: String,
    /// Query parameter holding the page number within a category.
    pub page_param: String,
    pub overlay_image_selector: String,
    pub overlay_caption_selector: String,
    pub overlay_close_selector: String,
}
impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            // Infallible: static, well-formed URL.
            start_url: Url::parse(&format!("https://{DEFAULT_DOMAIN}/")).expect("default start URL is well-formed"),
            allowed_domain: DEFAULT_DOMAIN.to_string(),
            gallery_markers: vec!["page=10076".to_string()],
            gallery_keyword: "galerie".to_string(),
            category_param: "ng".to_string(),
            category_id_param: "galerie".to_string(),
            page_param: "num".to_string(),
            overlay_image_selector: ".mfp-img".to_string(),
            overlay_caption_selector: ".mfp-title".to_string(),
            overlay_close_selector: ".mfp-close".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Pause after every page; doubled between categories.
    pub request_delay_ms: u64,
    pub navigation_timeout_secs: u64,
    /// Extra wait after load for late content.
    pub settle_ms: u64,
    pub overlay_timeout_ms: u64,
    /// Pause after closing an overlay, before the next thumbnail is clicked.
    pub overlay_pause_ms: u64,
    pub headless: bool,
    pub chrome_executable: Option<PathBuf>,
    /// Mirror verbose logs into `debug_log.txt` inside the run directory.
    pub debug_log: bool,
}
impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            request_delay_ms: 500,
            navigation_timeout_secs: 60,
            settle_ms: 2000,
            overlay_timeout_ms: 2000,
            overlay_pause_ms: 200,
            headless: true,
            chrome_executable: None,
            debug_log: true,
        }
    }
}
impl CrawlConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn overlay_timeout(&self) -> Duration {
        Duration::from_millis(self.overlay_timeout_ms)
    }

    pub fn overlay_pause(&self) -> Duration {
        Duration::from_millis(self.overlay_pause_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub timeout_secs: u64,
    pub max_image_size: u64,
    /// Accepted file extensions, lowercase with leading dot.
    pub extensions: Vec<String>,
}
impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            max_image_size: 50 * 1024 * 1024,
            extensions: [".jpg", ".jpeg", ".png", ".gif", ".webp", ".bmp"].map(String::from).to_vec(),
        }
    }
}
impl DownloadConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of everything the crawler writes.
    pub assets: PathBuf,
    /// Give every crawl its own `crawl_runs/run_<timestamp>` directory.
    pub timestamped_runs: bool,
}
impl Default for OutputConfig {
    fn default() -> Self {
        Self { assets: PathBuf::from("assets"), timestamped_runs: true }
    }
}

impl Config {
    /// Load and validate configuration from all layers.
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config: Self = Self::figment(path)?.extract().or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        Ok(config)
    }

    /// The layered provider stack, without extraction.
    pub fn figment(path: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        let file = match path {
            Some(path) if !path.exists() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => default_path().filter(|p| p.exists()),
        };
        if let Some(file) = file {
            tracing::debug!(path = %file.display(), "Loading configuration file");
            figment = match file.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(&file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(&file)),
                Some("json") => figment.merge(Json::file(&file)),
                _ => exn::bail!(ErrorKind::UnsupportedFormat(file)),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.site.allowed_domain.trim().is_empty() {
            exn::bail!(ErrorKind::Invalid { field: "site.allowed_domain", reason: "must not be empty".into() });
        }
        if !self.is_allowed_host(self.site.start_url.host_str().unwrap_or_default()) {
            exn::bail!(ErrorKind::Invalid {
                field: "site.start_url",
                reason: format!("host is outside {}", self.site.allowed_domain),
            });
        }
        if self.download.max_image_size == 0 {
            exn::bail!(ErrorKind::Invalid { field: "download.max_image_size", reason: "must be positive".into() });
        }
        if let Some(ext) = self.download.extensions.iter().find(|e| !e.starts_with('.')) {
            exn::bail!(ErrorKind::Invalid {
                field: "download.extensions",
                reason: format!("'{ext}' must start with a dot"),
            });
        }
        Ok(())
    }

    /// `true` for the configured domain and its `www.` alias.
    pub fn is_allowed_host(&self, host: &str) -> bool {
        let domain = self.site.allowed_domain.as_str();
        host.eq_ignore_ascii_case(domain)
            || host.strip_prefix("www.").is_some_and(|bare| bare.eq_ignore_ascii_case(domain))
    }
}

/// `config.toml` in the platform configuration directory, if one exists.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("com", "odexpo", "galerie").map(|dirs| dirs.config_dir().join("config.toml"))
}
