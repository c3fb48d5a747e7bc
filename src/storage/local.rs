// src/storage/local.rs

//! Local filesystem storage implementation.
//!
//! Keeps all event records in a single JSON file under the root directory,
//! keyed by source URL. Suited for development and single-process use.
//!
//! ## Storage Layout
//!
//! ```text
//! {root}/
//! └── events.json     # Map of source URL to stored event
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::StoredEvent;
use crate::storage::EventStore;

const EVENTS_FILE: &str = "events.json";

/// Local filesystem storage backend.
#[derive(Clone)]
pub struct LocalStore {
    root_dir: PathBuf,
}

impl LocalStore {
    /// Create a new LocalStore rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    fn events_path(&self) -> PathBuf {
        self.root_dir.join(EVENTS_FILE)
    }

    /// Read the full record map, treating a missing file as empty.
    async fn read_all(&self) -> Result<BTreeMap<String, StoredEvent>> {
        match tokio::fs::read(self.events_path()).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Write the full record map atomically (write to temp, then rename).
    async fn write_all(&self, events: &BTreeMap<String, StoredEvent>) -> Result<()> {
        let path = self.events_path();
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(events)?;
        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl EventStore for LocalStore {
    async fn find_by_source_url(&self, source_url: &str) -> Result<Option<StoredEvent>> {
        let events = self.read_all().await?;
        Ok(events.get(source_url).cloned())
    }

    async fn create(&self, event: StoredEvent) -> Result<()> {
        let mut events = self.read_all().await?;
        if events.contains_key(&event.source_url) {
            return Err(AppError::store(format!(
                "record already exists for {}",
                event.source_url
            )));
        }
        events.insert(event.source_url.clone(), event);
        self.write_all(&events).await
    }

    async fn save(&self, mut event: StoredEvent) -> Result<()> {
        let mut events = self.read_all().await?;
        let Some(existing) = events.get(&event.source_url) else {
            return Err(AppError::store(format!(
                "no record to save for {}",
                event.source_url
            )));
        };
        event.created_at = existing.created_at;
        event.updated_at = Utc::now();
        events.insert(event.source_url.clone(), event);
        self.write_all(&events).await
    }

    async fn load_all(&self) -> Result<Vec<StoredEvent>> {
        let events = self.read_all().await?;
        Ok(events.into_values().collect())
    }
}
