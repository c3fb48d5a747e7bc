// src/models/config.rs

//! Application configuration structures.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Source page identity
    #[serde(default)]
    pub source: SourceConfig,

    /// Headless browser behavior
    #[serde(default)]
    pub browser: BrowserConfig,

    /// DOM extraction heuristics
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
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
        if self.source.url.trim().is_empty() {
            return Err(AppError::validation("source.url is empty"));
        }
        url::Url::parse(&self.source.url)
            .map_err(|e| AppError::validation(format!("source.url is not a valid URL: {e}")))?;
        if self.source.name.trim().is_empty() {
            return Err(AppError::validation("source.name is empty"));
        }
        if self.source.city.trim().is_empty() {
            return Err(AppError::validation("source.city is empty"));
        }
        if self.source.readiness_selector.trim().is_empty() {
            return Err(AppError::validation("source.readiness_selector is empty"));
        }
        if self.browser.nav_timeout_secs == 0 {
            return Err(AppError::validation("browser.nav_timeout_secs must be > 0"));
        }
        if self.browser.readiness_timeout_secs == 0 {
            return Err(AppError::validation(
                "browser.readiness_timeout_secs must be > 0",
            ));
        }
        if self.browser.scroll_step_px == 0 {
            return Err(AppError::validation("browser.scroll_step_px must be > 0"));
        }
        if self.extraction.heading_selector.trim().is_empty() {
            return Err(AppError::validation("extraction.heading_selector is empty"));
        }
        if self.extraction.placeholder_image.trim().is_empty() {
            return Err(AppError::validation("extraction.placeholder_image is empty"));
        }
        if self.extraction.max_events == 0 {
            return Err(AppError::validation("extraction.max_events must be > 0"));
        }
        if self.extraction.description_limit == 0 {
            return Err(AppError::validation(
                "extraction.description_limit must be > 0",
            ));
        }
        Ok(())
    }
}

/// Identity of the source page being scraped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL of the event listing page
    #[serde(default = "defaults::source_url")]
    pub url: String,

    /// Label identifying the origin site on every record
    #[serde(default = "defaults::source_name")]
    pub name: String,

    /// City used as the default venue when the markup has none
    #[serde(default = "defaults::city")]
    pub city: String,

    /// DOM marker whose appearance signals the page has rendered
    #[serde(default = "defaults::readiness_selector")]
    pub readiness_selector: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::source_url(),
            name: defaults::source_name(),
            city: defaults::city(),
            readiness_selector: defaults::readiness_selector(),
        }
    }
}

/// Headless browser session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Page navigation timeout in seconds
    #[serde(default = "defaults::nav_timeout")]
    pub nav_timeout_secs: u64,

    /// Timeout for the readiness selector to appear, in seconds
    #[serde(default = "defaults::readiness_timeout")]
    pub readiness_timeout_secs: u64,

    /// Extra wait after readiness before scrolling, in milliseconds
    #[serde(default = "defaults::initial_wait")]
    pub initial_wait_ms: u64,

    /// Scroll step size in pixels
    #[serde(default = "defaults::scroll_step")]
    pub scroll_step_px: u32,

    /// Delay between scroll steps in milliseconds
    #[serde(default = "defaults::scroll_delay")]
    pub scroll_delay_ms: u64,

    /// Pause after scrolling back to top, letting lazy images resolve
    #[serde(default = "defaults::settle")]
    pub settle_ms: u64,

    /// Browser window width
    #[serde(default = "defaults::window_width")]
    pub window_width: u32,

    /// Browser window height
    #[serde(default = "defaults::window_height")]
    pub window_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            nav_timeout_secs: defaults::nav_timeout(),
            readiness_timeout_secs: defaults::readiness_timeout(),
            initial_wait_ms: defaults::initial_wait(),
            scroll_step_px: defaults::scroll_step(),
            scroll_delay_ms: defaults::scroll_delay(),
            settle_ms: defaults::settle(),
            window_width: defaults::window_width(),
            window_height: defaults::window_height(),
        }
    }
}

/// DOM extraction heuristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionConfig {
    /// Selector for event title anchors (the source has no stable card classes)
    #[serde(default = "defaults::heading_selector")]
    pub heading_selector: String,

    /// Fallback image when no usable image is found
    #[serde(default = "defaults::placeholder_image")]
    pub placeholder_image: String,

    /// Maximum unique events kept per pass
    #[serde(default = "defaults::max_events")]
    pub max_events: usize,

    /// Description truncation limit in characters
    #[serde(default = "defaults::description_limit")]
    pub description_limit: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            heading_selector: defaults::heading_selector(),
            placeholder_image: defaults::placeholder_image(),
            max_events: defaults::max_events(),
            description_limit: defaults::description_limit(),
        }
    }
}

mod defaults {
    // Source defaults
    pub fn source_url() -> String {
        "https://whatson.cityofsydney.nsw.gov.au/".into()
    }
    pub fn source_name() -> String {
        "What's On Sydney".into()
    }
    pub fn city() -> String {
        "Sydney".into()
    }
    pub fn readiness_selector() -> String {
        "h3".into()
    }

    // Browser defaults
    pub fn nav_timeout() -> u64 {
        60
    }
    pub fn readiness_timeout() -> u64 {
        15
    }
    pub fn initial_wait() -> u64 {
        2000
    }
    pub fn scroll_step() -> u32 {
        300
    }
    pub fn scroll_delay() -> u64 {
        100
    }
    pub fn settle() -> u64 {
        2000
    }
    pub fn window_width() -> u32 {
        1920
    }
    pub fn window_height() -> u32 {
        1080
    }

    // Extraction defaults
    pub fn heading_selector() -> String {
        "h3".into()
    }
    pub fn placeholder_image() -> String {
        "https://placehold.co/600x400?text=Event".into()
    }
    pub fn max_events() -> usize {
        20
    }
    pub fn description_limit() -> usize {
        300
    }
}
