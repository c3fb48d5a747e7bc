// src/pipeline/sync.rs

//! Reconciliation of scraped candidates against the store.
//!
//! Each candidate is classified against the stored record with the same
//! source URL: absent records are created, matching fingerprints only
//! refresh the sighting timestamp, and differing fingerprints overwrite
//! the stored content. Records missing from the page are never touched.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::models::{EventStatus, StoredEvent, SyncCandidate};
use crate::storage::EventStore;

/// Per-pass reconciliation tally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    pub added: usize,
    pub updated: usize,
    pub unchanged: usize,
}

impl SyncOutcome {
    pub fn total(&self) -> usize {
        self.added + self.updated + self.unchanged
    }
}

enum SyncClass {
    Added,
    Updated,
    Unchanged,
}

/// Reconcile a batch of candidates against the store.
///
/// Store failures on individual records are logged and skipped without
/// aborting the pass; failed records are not counted in the outcome.
pub async fn sync_events(candidates: &[SyncCandidate], store: &dyn EventStore) -> SyncOutcome {
    let mut outcome = SyncOutcome::default();

    for candidate in candidates {
        match sync_one(candidate, store).await {
            Ok(SyncClass::Added) => outcome.added += 1,
            Ok(SyncClass::Updated) => outcome.updated += 1,
            Ok(SyncClass::Unchanged) => outcome.unchanged += 1,
            Err(e) => {
                log::warn!(
                    "Skipping {} after store error: {}",
                    candidate.event.source_url,
                    e
                );
            }
        }
    }

    outcome
}

async fn sync_one(
    candidate: &SyncCandidate,
    store: &dyn EventStore,
) -> crate::error::Result<SyncClass> {
    let now = Utc::now();

    let Some(mut existing) = store
        .find_by_source_url(&candidate.event.source_url)
        .await?
    else {
        store
            .create(StoredEvent::from_candidate(candidate, now))
            .await?;
        return Ok(SyncClass::Added);
    };

    if existing.fingerprint == candidate.fingerprint {
        existing.last_scraped_at = now;
        store.save(existing).await?;
        return Ok(SyncClass::Unchanged);
    }

    if existing.status == EventStatus::Imported || existing.is_imported {
        log::warn!(
            "Imported record {} changed at the source; overwriting local copy",
            existing.source_url
        );
    }
    existing.apply_update(candidate, now);
    store.save(existing).await?;
    Ok(SyncClass::Updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, Result};
    use crate::models::ScrapedEvent;
    use crate::storage::LocalStore;
    use async_trait::async_trait;
    use tempfile::TempDir;

    fn candidate(title: &str, url: &str) -> SyncCandidate {
        SyncCandidate {
            event: ScrapedEvent {
                title: title.to_string(),
                date: "Date TBA".to_string(),
                venue: "Sydney".to_string(),
                city: "Sydney".to_string(),
                description: "desc".to_string(),
                image: "https://placehold.co/600x400?text=Event".to_string(),
                source_url: url.to_string(),
                source_name: "What's On Sydney".to_string(),
            },
            fingerprint: crate::pipeline::fingerprint::fingerprint(title, url),
        }
    }

    #[tokio::test]
    async fn test_first_pass_creates_everything() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        let batch = vec![
            candidate("A", "https://ex.com/a"),
            candidate("B", "https://ex.com/b"),
            candidate("C", "https://ex.com/c"),
        ];
        let outcome = sync_events(&batch, &store).await;

        assert_eq!(outcome.added, 3);
        assert_eq!(outcome.updated, 0);
        assert_eq!(outcome.unchanged, 0);

        let stored = store
            .find_by_source_url("https://ex.com/a")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, EventStatus::New);
    }

    #[tokio::test]
    async fn test_identical_second_pass_is_all_unchanged() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        let batch = vec![candidate("A", "https://ex.com/a")];
        sync_events(&batch, &store).await;
        let first = store
            .find_by_source_url("https://ex.com/a")
            .await
            .unwrap()
            .unwrap();

        let outcome = sync_events(&batch, &store).await;
        assert_eq!(outcome, SyncOutcome {
            added: 0,
            updated: 0,
            unchanged: 1
        });

        let second = store
            .find_by_source_url("https://ex.com/a")
            .await
            .unwrap()
            .unwrap();
        // Only the sighting timestamp moves
        assert_eq!(second.status, EventStatus::New);
        assert_eq!(second.title, first.title);
        assert!(second.last_scraped_at >= first.last_scraped_at);
    }

    #[tokio::test]
    async fn test_title_change_updates_record() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        sync_events(&[candidate("A", "https://ex.com/a")], &store).await;

        let renamed = candidate("A Renamed", "https://ex.com/a");
        let outcome = sync_events(&[renamed.clone()], &store).await;
        assert_eq!(outcome.updated, 1);

        let stored = store
            .find_by_source_url("https://ex.com/a")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, "A Renamed");
        assert_eq!(stored.status, EventStatus::Updated);
        assert_eq!(stored.fingerprint, renamed.fingerprint);
    }

    #[tokio::test]
    async fn test_mixed_pass_counts_each_class() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        sync_events(
            &[
                candidate("A", "https://ex.com/a"),
                candidate("B", "https://ex.com/b"),
            ],
            &store,
        )
        .await;
        let b_before = store
            .find_by_source_url("https://ex.com/b")
            .await
            .unwrap()
            .unwrap();

        let outcome = sync_events(
            &[
                candidate("A Renamed", "https://ex.com/a"),
                candidate("B", "https://ex.com/b"),
            ],
            &store,
        )
        .await;
        assert_eq!(outcome, SyncOutcome {
            added: 0,
            updated: 1,
            unchanged: 1
        });

        let b_after = store
            .find_by_source_url("https://ex.com/b")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(b_after.status, EventStatus::New);
        assert_eq!(b_after.fingerprint, b_before.fingerprint);
        assert!(b_after.last_scraped_at >= b_before.last_scraped_at);
    }

    #[tokio::test]
    async fn test_absent_records_are_left_alone() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        sync_events(
            &[
                candidate("A", "https://ex.com/a"),
                candidate("B", "https://ex.com/b"),
            ],
            &store,
        )
        .await;

        // Next pass only sees A
        let outcome = sync_events(&[candidate("A", "https://ex.com/a")], &store).await;
        assert_eq!(outcome.total(), 1);

        let b = store
            .find_by_source_url("https://ex.com/b")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(b.status, EventStatus::New);
    }

    #[tokio::test]
    async fn test_imported_record_keeps_flag_through_update() {
        let tmp = TempDir::new().unwrap();
        let store = LocalStore::new(tmp.path());

        sync_events(&[candidate("A", "https://ex.com/a")], &store).await;

        // Simulate downstream promotion
        let mut promoted = store
            .find_by_source_url("https://ex.com/a")
            .await
            .unwrap()
            .unwrap();
        promoted.status = EventStatus::Imported;
        promoted.is_imported = true;
        promoted.imported_at = Some(Utc::now());
        store.save(promoted).await.unwrap();

        let outcome = sync_events(&[candidate("A Renamed", "https://ex.com/a")], &store).await;
        assert_eq!(outcome.updated, 1);

        let stored = store
            .find_by_source_url("https://ex.com/a")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.title, "A Renamed");
        assert_eq!(stored.status, EventStatus::Updated);
        assert!(stored.is_imported);
        assert!(stored.imported_at.is_some());
    }

    /// Store stub that rejects every write.
    struct FailingStore;

    #[async_trait]
    impl EventStore for FailingStore {
        async fn find_by_source_url(&self, _source_url: &str) -> Result<Option<StoredEvent>> {
            Ok(None)
        }
        async fn create(&self, _event: StoredEvent) -> Result<()> {
            Err(AppError::store("disk full"))
        }
        async fn save(&self, _event: StoredEvent) -> Result<()> {
            Err(AppError::store("disk full"))
        }
        async fn load_all(&self) -> Result<Vec<StoredEvent>> {
            Ok(Vec::new())
        }
    }

    #[tokio::test]
    async fn test_store_failures_are_skipped_and_uncounted() {
        let outcome = sync_events(&[candidate("A", "https://ex.com/a")], &FailingStore).await;
        assert_eq!(outcome.total(), 0);
    }
}
