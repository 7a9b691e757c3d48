//! Configuration management for catalog-scraper using the prefer crate.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::browser::BrowserEngineConfig;
use crate::listing::{Pacing, RunLimits, Section, SelectorConfig};

/// Default output filename.
pub const DEFAULT_OUTPUT: &str = "snapdeal_products.csv";

/// Name used for config file discovery.
const CONFIG_NAME: &str = "catalog-scraper";

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {format} config {path}: {message}")]
    Parse {
        path: PathBuf,
        format: &'static str,
        message: String,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// The built-in category searches.
pub fn default_sections() -> Vec<Section> {
    [
        ("Accessories", "accessories"),
        ("Footwear", "footwear"),
        ("Kids' Fashion", "kids%20fashion"),
        ("Men's Clothing", "men%20clothing"),
        ("Women's Clothing", "women%20clothing"),
    ]
    .into_iter()
    .map(|(name, keyword)| {
        Section::new(
            name,
            format!(
                "https://www.snapdeal.com/search?keyword={}&sort=rlvncy",
                keyword
            ),
        )
    })
    .collect()
}

/// Scraper configuration. Every key is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CSV output path. `~` is expanded; relative paths resolve against the
    /// config file's directory, or the working directory without one.
    pub output: String,
    /// Pause after each lazy-load scroll.
    pub scroll_pause_ms: u64,
    /// Upper bound on scrolls per listing page.
    pub max_scrolls: u32,
    /// Longest wait for the product grid after a page load.
    pub listing_wait_secs: u64,
    pub max_pages_per_subcategory: u32,
    /// Visit every product page for extended fields.
    pub deep_scrape: bool,
    /// Stop a subcategory after this many products.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_products_per_subcategory: Option<usize>,
    pub click_pause_ms: u64,
    pub url_change_wait_secs: u64,
    pub poll_interval_ms: u64,
    /// Character cap on the joined image URL list.
    pub image_urls_max_len: usize,
    pub browser: BrowserEngineConfig,
    pub selectors: SelectorConfig,
    /// Sections to walk, in order.
    pub sections: Vec<Section>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: DEFAULT_OUTPUT.to_string(),
            scroll_pause_ms: 800,
            max_scrolls: 20,
            listing_wait_secs: 10,
            max_pages_per_subcategory: 3,
            deep_scrape: false,
            max_products_per_subcategory: None,
            click_pause_ms: 1200,
            url_change_wait_secs: 6,
            poll_interval_ms: 250,
            image_urls_max_len: 2000,
            browser: BrowserEngineConfig::default(),
            selectors: SelectorConfig::default(),
            sections: default_sections(),
            source_path: None,
        }
    }
}

impl Config {
    /// Load configuration using prefer for discovery.
    /// Falls back to the built-in defaults when no config file exists.
    pub async fn load() -> Result<Self, ConfigError> {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => match pref_config.source_path() {
                Some(path) => Self::load_from_path(path).await,
                None => Ok(Self::default()),
            },
            Err(e) => {
                tracing::debug!("No config file discovered: {}", e);
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a specific file path.
    /// The format follows the extension: TOML, YAML, otherwise JSON.
    pub async fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let mut config = Self::parse(path, &contents)?;
        config.source_path = Some(path.to_path_buf());
        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    fn parse(path: &Path, contents: &str) -> Result<Self, ConfigError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parse_error = |format: &'static str, message: String| ConfigError::Parse {
            path: path.to_path_buf(),
            format,
            message,
        };

        match ext {
            "toml" => toml::from_str(contents).map_err(|e| parse_error("TOML", e.to_string())),
            "yaml" | "yml" => {
                serde_yaml::from_str(contents).map_err(|e| parse_error("YAML", e.to_string()))
            }
            _ => serde_json::from_str(contents).map_err(|e| parse_error("JSON", e.to_string())),
        }
    }

    /// Get the base directory for resolving relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a path that may be relative to the config file.
    /// - Absolute paths are returned as-is
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved relative to `base_dir`
    pub fn resolve_path(&self, path_str: &str, base_dir: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Where the CSV is written.
    pub fn output_path(&self) -> PathBuf {
        let base_dir = self
            .base_dir()
            .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")));
        self.resolve_path(&self.output, &base_dir)
    }

    pub fn pacing(&self) -> Pacing {
        Pacing {
            scroll_pause: Duration::from_millis(self.scroll_pause_ms),
            click_pause: Duration::from_millis(self.click_pause_ms),
            listing_wait: Duration::from_secs(self.listing_wait_secs),
            url_change_wait: Duration::from_secs(self.url_change_wait_secs),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
        }
    }

    pub fn limits(&self) -> RunLimits {
        RunLimits {
            max_pages_per_subcategory: self.max_pages_per_subcategory,
            max_products_per_subcategory: self.max_products_per_subcategory,
            max_scrolls: self.max_scrolls,
            deep_scrape: self.deep_scrape,
            image_urls_max_len: self.image_urls_max_len,
        }
    }

    /// Keep only the sections whose name matches one of `names`
    /// (case-insensitive), preserving configured order.
    pub fn retain_sections(&mut self, names: &[String]) -> Result<(), ConfigError> {
        if names.is_empty() {
            return Ok(());
        }
        self.sections
            .retain(|s| names.iter().any(|n| n.eq_ignore_ascii_case(&s.name)));
        if self.sections.is_empty() {
            return Err(ConfigError::Invalid(format!(
                "no configured section matches {}",
                names.join(", ")
            )));
        }
        Ok(())
    }

    /// Check the values a run depends on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sections.is_empty() {
            return Err(ConfigError::Invalid("at least one section is required".into()));
        }
        for section in &self.sections {
            let parsed = Url::parse(&section.url).map_err(|e| {
                ConfigError::Invalid(format!(
                    "section '{}' has an invalid URL {}: {}",
                    section.name, section.url, e
                ))
            })?;
            if !matches!(parsed.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(format!(
                    "section '{}' URL must be http(s), got {}",
                    section.name, section.url
                )));
            }
        }
        if self.max_pages_per_subcategory == 0 {
            return Err(ConfigError::Invalid(
                "max_pages_per_subcategory must be at least 1".into(),
            ));
        }
        if self.max_products_per_subcategory == Some(0) {
            return Err(ConfigError::Invalid(
                "max_products_per_subcategory must be positive when set".into(),
            ));
        }
        if self.selectors.listing.cards.is_empty() {
            return Err(ConfigError::Invalid("selectors.listing.cards is empty".into()));
        }
        if self.output.trim().is_empty() {
            return Err(ConfigError::Invalid("output path is empty".into()));
        }
        Ok(())
    }

    /// Render the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Invalid(e.to_string()))
    }
}
