// src/browser.rs

//! Headless browser page fetching.
//!
//! The listing page renders client-side and lazy-loads content on scroll,
//! so a plain HTTP fetch returns an empty shell. A Chrome session opens
//! the page, waits for the readiness marker, scrolls to the bottom to
//! trigger lazy loading, and hands back the rendered HTML.

use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions, Tab};

use crate::error::{AppError, Result};
use crate::models::BrowserConfig;

/// Launches Chrome sessions for rendering the listing page.
pub struct PageFetcher {
    config: BrowserConfig,
}

impl PageFetcher {
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }

    /// Open the page and block until the readiness selector appears.
    ///
    /// Fatal on navigation failure or readiness timeout; the whole pass
    /// is abandoned rather than scraping a half-rendered page.
    pub async fn open(&self, url: &str, readiness_selector: &str) -> Result<PageSession> {
        let options = LaunchOptions {
            headless: false,
            window_size: Some((self.config.window_width, self.config.window_height)),
            args: vec![
                OsStr::new("--headless=new"),
                OsStr::new("--no-sandbox"),
                OsStr::new("--disable-dev-shm-usage"),
            ],
            ..Default::default()
        };

        let browser = Browser::new(options).map_err(|e| AppError::navigation(url, e))?;
        let tab = browser.new_tab().map_err(|e| AppError::navigation(url, e))?;
        tab.set_default_timeout(Duration::from_secs(self.config.nav_timeout_secs));

        tab.navigate_to(url).map_err(|e| AppError::navigation(url, e))?;
        tab.wait_until_navigated()
            .map_err(|e| AppError::navigation(url, e))?;

        log::info!("Waiting for '{}' to appear on {}", readiness_selector, url);
        tab.wait_for_element_with_custom_timeout(
            readiness_selector,
            Duration::from_secs(self.config.readiness_timeout_secs),
        )
        .map_err(|e| {
            AppError::navigation(url, format!("readiness selector never appeared: {e}"))
        })?;

        // Let late scripts finish before touching the DOM
        tokio::time::sleep(Duration::from_millis(self.config.initial_wait_ms)).await;

        Ok(PageSession {
            _browser: browser,
            tab,
            url: url.to_string(),
            config: self.config.clone(),
        })
    }
}

/// An open page inside a live Chrome session.
///
/// Dropping the session tears down the browser process.
pub struct PageSession {
    _browser: Browser,
    tab: Arc<Tab>,
    url: String,
    config: BrowserConfig,
}

impl PageSession {
    /// Scroll to the bottom of the page in fixed steps so lazy-loaded
    /// cards and images are brought in, then return to the top and let
    /// the page settle.
    pub async fn scroll_to_bottom(&self) -> Result<()> {
        let step = u64::from(self.config.scroll_step_px);
        let delay = Duration::from_millis(self.config.scroll_delay_ms);
        let mut scrolled: u64 = 0;

        loop {
            let height = self.eval_u64("document.body.scrollHeight")?;
            if scrolled >= height {
                break;
            }
            self.eval(&format!("window.scrollBy(0, {step})"))?;
            scrolled += step;
            tokio::time::sleep(delay).await;
        }

        self.eval("window.scrollTo(0, 0)")?;
        tokio::time::sleep(Duration::from_millis(self.config.settle_ms)).await;
        Ok(())
    }

    /// Rendered HTML of the current document.
    pub fn content(&self) -> Result<String> {
        self.tab
            .get_content()
            .map_err(|e| AppError::navigation(&self.url, e))
    }

    /// Close the session. Dropping has the same effect; this just makes
    /// the intent explicit at call sites.
    pub fn close(self) {}

    fn eval(&self, expr: &str) -> Result<()> {
        self.tab
            .evaluate(expr, false)
            .map_err(|e| AppError::navigation(&self.url, e))?;
        Ok(())
    }

    fn eval_u64(&self, expr: &str) -> Result<u64> {
        let result = self
            .tab
            .evaluate(expr, false)
            .map_err(|e| AppError::navigation(&self.url, e))?;
        let value = result
            .value
            .as_ref()
            .and_then(|v| v.as_u64().or_else(|| v.as_f64().map(|f| f as u64)))
            .ok_or_else(|| {
                AppError::navigation(&self.url, format!("'{expr}' returned no number"))
            })?;
        Ok(value)
    }
}
