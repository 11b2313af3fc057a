//! Configuration types for chapter-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Hard upper bound on the worker pool size
pub const MAX_WORKERS: usize = 20;

/// Crawl behavior configuration (worker pool, pacing, output)
///
/// Groups settings related to how pages are fetched and where chapter files
/// land. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Number of concurrent workers, 1 to [`MAX_WORKERS`] (default: 5)
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Fixed delay before each request, in seconds (default: 0.5)
    #[serde(default = "default_request_delay")]
    pub request_delay_secs: f64,

    /// Per-request timeout, in seconds (default: 10.0)
    #[serde(default = "default_timeout")]
    pub timeout_secs: f64,

    /// User-Agent header sent with each request (default: a browser string)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Directory chapter files are written to (default: "chapters")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

impl CrawlConfig {
    /// Per-request delay as a [`Duration`].
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs_f64(self.request_delay_secs.max(0.0))
    }

    /// Per-request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs.max(0.0))
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            request_delay_secs: default_request_delay(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            output_dir: default_output_dir(),
        }
    }
}

/// Extraction profile: where the title and content live in the page markup,
/// and which boilerplate fragments to strip
///
/// The defaults describe the site the crawler was written against; every
/// field can be overridden for a differently-structured source.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Selector for the chapter heading (default: "div.m-title h1")
    #[serde(default = "default_title_selector")]
    pub title_selector: String,

    /// Selector for the primary content container (default: "div#content")
    #[serde(default = "default_content_selector")]
    pub content_selector: String,

    /// Selector for pagination/footer blocks removed from the content
    /// (default: "div.m-tpage")
    #[serde(default = "default_pagination_selector")]
    pub pagination_selector: String,

    /// Site-attribution phrase; text blocks containing it are removed
    #[serde(default = "default_attribution_phrase")]
    pub attribution_phrase: String,

    /// Third-party tracker token; containers mentioning it are removed
    #[serde(default = "default_tracker_token")]
    pub tracker_token: String,

    /// Comment marker opening an ad block (default: `<!--adstart-->`)
    #[serde(default = "default_ad_start")]
    pub ad_start_marker: String,

    /// Comment marker closing an ad block (default: `<!--adend-->`)
    #[serde(default = "default_ad_end")]
    pub ad_end_marker: String,

    /// Minimum cleaned-text length below which the extraction is flagged as
    /// low-confidence (default: 50)
    #[serde(default = "default_min_content_chars")]
    pub min_content_chars: usize,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            title_selector: default_title_selector(),
            content_selector: default_content_selector(),
            pagination_selector: default_pagination_selector(),
            attribution_phrase: default_attribution_phrase(),
            tracker_token: default_tracker_token(),
            ad_start_marker: default_ad_start(),
            ad_end_marker: default_ad_end(),
            min_content_chars: default_min_content_chars(),
        }
    }
}

/// Seed harvesting profile (index-page link extraction)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HarvestConfig {
    /// Selector matching chapter links on the index page
    /// (default: "li.line3 a")
    #[serde(default = "default_link_selector")]
    pub link_selector: String,

    /// Keep only hrefs starting with this path prefix (default: keep all)
    #[serde(default)]
    pub path_prefix: Option<String>,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            link_selector: default_link_selector(),
            path_prefix: None,
        }
    }
}

/// Main configuration for the crawler
///
/// All fields have serde defaults, so a seed-list-only JSON document
/// (`{"seeds": ["https://...", ...]}`) — as written by the harvest utility —
/// is a complete configuration file.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Ordered list of page addresses to crawl
    #[serde(default)]
    pub seeds: Vec<String>,

    /// Crawl behavior
    #[serde(default)]
    pub crawl: CrawlConfig,

    /// Extraction profile
    #[serde(default)]
    pub extract: ExtractConfig,

    /// Harvest profile
    #[serde(default)]
    pub harvest: HarvestConfig,
}

impl Config {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        Ok(config)
    }

    /// Validate tunables, returning a [`Error::Config`] naming the offending
    /// key.
    pub fn validate(&self) -> Result<()> {
        if self.crawl.max_workers == 0 || self.crawl.max_workers > MAX_WORKERS {
            return Err(Error::Config {
                message: format!(
                    "max_workers must be between 1 and {MAX_WORKERS}, got {}",
                    self.crawl.max_workers
                ),
                key: Some("crawl.max_workers".to_string()),
            });
        }
        if self.crawl.timeout_secs <= 0.0 || !self.crawl.timeout_secs.is_finite() {
            return Err(Error::Config {
                message: format!("timeout_secs must be positive, got {}", self.crawl.timeout_secs),
                key: Some("crawl.timeout_secs".to_string()),
            });
        }
        if self.crawl.request_delay_secs < 0.0 || !self.crawl.request_delay_secs.is_finite() {
            return Err(Error::Config {
                message: format!(
                    "request_delay_secs must be a non-negative number, got {}",
                    self.crawl.request_delay_secs
                ),
                key: Some("crawl.request_delay_secs".to_string()),
            });
        }
        Ok(())
    }
}

fn default_max_workers() -> usize {
    5
}

fn default_request_delay() -> f64 {
    0.5
}

fn default_timeout() -> f64 {
    10.0
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("chapters")
}

fn default_title_selector() -> String {
    "div.m-title h1".to_string()
}

fn default_content_selector() -> String {
    "div#content".to_string()
}

fn default_pagination_selector() -> String {
    "div.m-tpage".to_string()
}

fn default_attribution_phrase() -> String {
    "斗破小说网".to_string()
}

fn default_tracker_token() -> String {
    "chambulwacs".to_string()
}

fn default_ad_start() -> String {
    "<!--adstart-->".to_string()
}

fn default_ad_end() -> String {
    "<!--adend-->".to_string()
}

fn default_min_content_chars() -> usize {
    50
}

fn default_link_selector() -> String {
    "li.line3 a".to_string()
}
