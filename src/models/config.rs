// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::Platform;

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Catalog file location
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Shared post formatting
    #[serde(default)]
    pub post: PostConfig,

    /// Platform A (short-form text) limits and endpoint
    #[serde(default)]
    pub twitter: TwitterConfig,

    /// Platform B (rich text) limits and endpoint
    #[serde(default)]
    pub bluesky: BlueskyConfig,

    /// HTTP client settings used for preview scraping
    #[serde(default)]
    pub http: HttpConfig,

    /// Link preview settings
    #[serde(default)]
    pub preview: PreviewConfig,

    /// Ordered keyword to hashtag substitutions
    #[serde(default = "defaults::hashtag_rules")]
    pub hashtags: Vec<HashtagRule>,

    /// Catalog link checking
    #[serde(default)]
    pub links: LinksConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load and validate configuration, failing on a missing or malformed file.
    pub fn load_validated(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::load(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.catalog.path.trim().is_empty() {
            return Err(AppError::validation("catalog.path is empty"));
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(AppError::validation("http.user_agent is empty"));
        }
        if self.http.page_timeout_secs == 0 || self.http.image_timeout_secs == 0 {
            return Err(AppError::validation("http timeouts must be > 0"));
        }
        if self.twitter.link_reservation + self.post.ellipsis.chars().count()
            >= self.twitter.max_chars
        {
            return Err(AppError::validation(
                "twitter.link_reservation leaves no room for text",
            ));
        }
        if self.bluesky.max_chars <= self.post.ellipsis.chars().count() {
            return Err(AppError::validation("bluesky.max_chars is too small"));
        }
        if !self.preview.default_image_mime.starts_with("image/") {
            return Err(AppError::validation(
                "preview.default_image_mime must be an image type",
            ));
        }
        if let Some(rule) = self.hashtags.iter().find(|r| r.pattern.is_empty()) {
            return Err(AppError::validation(format!(
                "hashtag rule with empty pattern (replacement '{}')",
                rule.replacement
            )));
        }
        if self.links.max_concurrent == 0 {
            return Err(AppError::validation("links.max_concurrent must be > 0"));
        }
        Ok(())
    }

    /// Character budget for a platform.
    pub fn limits(&self, platform: Platform) -> PlatformLimits {
        match platform {
            Platform::Twitter => PlatformLimits {
                max_chars: self.twitter.max_chars,
                link_reservation: self.twitter.link_reservation,
            },
            Platform::Bluesky => PlatformLimits {
                max_chars: self.bluesky.max_chars,
                link_reservation: 0,
            },
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: CatalogConfig::default(),
            post: PostConfig::default(),
            twitter: TwitterConfig::default(),
            bluesky: BlueskyConfig::default(),
            http: HttpConfig::default(),
            preview: PreviewConfig::default(),
            hashtags: defaults::hashtag_rules(),
            links: LinksConfig::default(),
        }
    }
}

/// Character cap and the part of it reserved for an inline link footer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlatformLimits {
    pub max_chars: usize,
    pub link_reservation: usize,
}

/// Catalog file settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Repository-relative path of the catalog document
    #[serde(default = "defaults::catalog_path")]
    pub path: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            path: defaults::catalog_path(),
        }
    }
}

/// Post formatting shared by both platforms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostConfig {
    /// Marker appended to truncated text
    #[serde(default = "defaults::ellipsis")]
    pub ellipsis: String,
}

impl Default for PostConfig {
    fn default() -> Self {
        Self {
            ellipsis: defaults::ellipsis(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TwitterConfig {
    /// Hard cap including the trailing link line
    #[serde(default = "defaults::twitter_max_chars")]
    pub max_chars: usize,

    /// Shortened link display length plus its newline
    #[serde(default = "defaults::twitter_link_reservation")]
    pub link_reservation: usize,

    #[serde(default = "defaults::twitter_api_url")]
    pub api_url: String,
}

impl Default for TwitterConfig {
    fn default() -> Self {
        Self {
            max_chars: defaults::twitter_max_chars(),
            link_reservation: defaults::twitter_link_reservation(),
            api_url: defaults::twitter_api_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlueskyConfig {
    /// Hard cap over the rendered text
    #[serde(default = "defaults::bluesky_max_chars")]
    pub max_chars: usize,

    /// PDS base URL for XRPC calls
    #[serde(default = "defaults::bluesky_service_url")]
    pub service_url: String,
}

impl Default for BlueskyConfig {
    fn default() -> Self {
        Self {
            max_chars: defaults::bluesky_max_chars(),
            service_url: defaults::bluesky_service_url(),
        }
    }
}

/// HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Timeout for the target page fetch
    #[serde(default = "defaults::timeout")]
    pub page_timeout_secs: u64,

    /// Timeout for the preview image fetch
    #[serde(default = "defaults::timeout")]
    pub image_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            page_timeout_secs: defaults::timeout(),
            image_timeout_secs: defaults::timeout(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// MIME type assumed when neither headers nor signatures identify an image
    #[serde(default = "defaults::default_image_mime")]
    pub default_image_mime: String,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            default_image_mime: defaults::default_image_mime(),
        }
    }
}

/// A literal keyword substitution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HashtagRule {
    pub pattern: String,
    pub replacement: String,
}

impl HashtagRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }
}

/// Catalog link checker settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinksConfig {
    /// URLs (or substrings such as domains) whose redirects are expected
    #[serde(default)]
    pub redirect_ignore: Vec<String>,

    /// URLs (or substrings) whose errors are tolerated
    #[serde(default)]
    pub error_ignore: Vec<String>,

    /// Maximum concurrent checks
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,

    /// Per-request timeout
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            redirect_ignore: Vec::new(),
            error_ignore: Vec::new(),
            max_concurrent: defaults::max_concurrent(),
            timeout_secs: defaults::timeout(),
        }
    }
}

mod defaults {
    use super::HashtagRule;

    pub fn catalog_path() -> String {
        "README.md".into()
    }
    pub fn ellipsis() -> String {
        "...".into()
    }

    // Platform defaults
    pub fn twitter_max_chars() -> usize {
        280
    }
    pub fn twitter_link_reservation() -> usize {
        24
    }
    pub fn twitter_api_url() -> String {
        "https://api.twitter.com/2/tweets".into()
    }
    pub fn bluesky_max_chars() -> usize {
        300
    }
    pub fn bluesky_service_url() -> String {
        "https://bsky.social".into()
    }

    // HTTP defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; catalog-announcer/0.1)".into()
    }
    pub fn timeout() -> u64 {
        10
    }
    pub fn max_concurrent() -> usize {
        16
    }
    pub fn default_image_mime() -> String {
        "image/jpeg".into()
    }

    // Order matters: later rules see text rewritten by earlier ones.
    pub fn hashtag_rules() -> Vec<HashtagRule> {
        [
            (" microbit", " #microbit"),
            (" micro:bit", " #microbit"),
            (" Python", " #Python"),
            (" python", " #Python"),
            ("MicroPython", "#MicroPython"),
            ("Micropython", "#MicroPython"),
            ("micropython", "#MicroPython"),
            ("Scratch", "#Scratch"),
            ("scratch", "#Scratch"),
            ("Raspberry Pi", "#RaspberryPi"),
            ("raspberry pi", "#RaspberryPi"),
            ("Raspberry pi", "#RaspberryPi"),
            ("raspberry Pi", "#RaspberryPi"),
            ("Arduino", "#Arduino"),
            ("arduino", "#Arduino"),
            ("MakeCode", "#MakeCode"),
            ("makecode", "#MakeCode"),
            ("Makecode", "#MakeCode"),
        ]
        .into_iter()
        .map(|(pattern, replacement)| HashtagRule::new(pattern, replacement))
        .collect()
    }
}
