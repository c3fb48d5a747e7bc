// src/pipeline/mod.rs

//! Scrape and sync pipeline.
//!
//! A pass is scrape (render, extract, dedupe, fingerprint) followed by
//! sync (reconcile candidates against the store). [`Syncer`] wraps a full
//! pass behind a single-flight guard so overlapping triggers are rejected
//! instead of queued.

pub mod dedupe;
pub mod fingerprint;
pub mod sync;

pub use dedupe::dedupe_and_fingerprint;
pub use fingerprint::fingerprint as event_fingerprint;
pub use sync::{sync_events, SyncOutcome};

use std::sync::Arc;

use url::Url;

use crate::browser::PageFetcher;
use crate::error::{AppError, Result};
use crate::extract::Extractor;
use crate::models::{Config, SyncCandidate};
use crate::storage::EventStore;

/// Run the scrape half of a pass: render the page, extract events and
/// prepare deduplicated, fingerprinted candidates.
pub async fn run_scrape(config: &Config) -> Result<Vec<SyncCandidate>> {
    let extractor = Extractor::new(config)?;
    let base_url = Url::parse(&config.source.url)?;

    let fetcher = PageFetcher::new(config.browser.clone());
    let session = fetcher
        .open(&config.source.url, &config.source.readiness_selector)
        .await?;
    session.scroll_to_bottom().await?;
    let html = session.content()?;
    session.close();

    let events = extractor.extract(&html, &base_url);
    let with_images = events
        .iter()
        .filter(|e| e.image != config.extraction.placeholder_image)
        .count();
    log::info!(
        "Extracted {} events ({} with real images) from {}",
        events.len(),
        with_images,
        config.source.url
    );

    let candidates = dedupe_and_fingerprint(events, config.extraction.max_events);
    log::info!("{} unique candidates after dedup", candidates.len());
    Ok(candidates)
}

/// Run a full pass: scrape, then reconcile against the store.
pub async fn run_sync(config: &Config, store: &dyn EventStore) -> Result<SyncOutcome> {
    let candidates = run_scrape(config).await?;
    if candidates.is_empty() {
        log::warn!("No events extracted; store left untouched");
        return Ok(SyncOutcome::default());
    }

    let outcome = sync_events(&candidates, store).await;
    log::info!(
        "Sync complete: {} added, {} updated, {} unchanged",
        outcome.added,
        outcome.updated,
        outcome.unchanged
    );
    Ok(outcome)
}

/// Runs passes one at a time.
///
/// A trigger arriving while a pass is in flight fails fast with
/// [`AppError::SyncInProgress`] rather than piling up browser sessions.
pub struct Syncer {
    config: Arc<Config>,
    store: Arc<dyn EventStore>,
    guard: tokio::sync::Mutex<()>,
}

impl Syncer {
    pub fn new(config: Arc<Config>, store: Arc<dyn EventStore>) -> Self {
        Self {
            config,
            store,
            guard: tokio::sync::Mutex::new(()),
        }
    }

    /// Run a full pass unless one is already in flight.
    pub async fn try_sync(&self) -> Result<SyncOutcome> {
        let _running = self.begin()?;
        run_sync(&self.config, self.store.as_ref()).await
    }

    fn begin(&self) -> Result<tokio::sync::MutexGuard<'_, ()>> {
        self.guard.try_lock().map_err(|_| AppError::SyncInProgress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LocalStore;
    use tempfile::TempDir;

    fn syncer(tmp: &TempDir) -> Syncer {
        Syncer::new(
            Arc::new(Config::default()),
            Arc::new(LocalStore::new(tmp.path())),
        )
    }

    #[tokio::test]
    async fn test_second_trigger_is_rejected_while_running() {
        let tmp = TempDir::new().unwrap();
        let syncer = syncer(&tmp);

        let running = syncer.begin().unwrap();
        assert!(matches!(syncer.begin(), Err(AppError::SyncInProgress)));

        drop(running);
        assert!(syncer.begin().is_ok());
    }
}
