// src/models/event.rs

//! Event record types.
//!
//! A pass produces [`ScrapedEvent`]s from the page, wraps them into
//! [`SyncCandidate`]s once fingerprinted and deduplicated, and reconciles
//! those against [`StoredEvent`]s in the store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A raw event record extracted from the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedEvent {
    pub title: String,
    pub date: String,
    pub venue: String,
    pub city: String,
    pub description: String,
    pub image: String,
    /// Absolute URL of the event detail page. Identity key within the store.
    pub source_url: String,
    pub source_name: String,
}

/// A deduplicated, fingerprinted event ready for reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCandidate {
    pub event: ScrapedEvent,
    /// Content fingerprint over title and source URL
    pub fingerprint: String,
}

/// Lifecycle status of a stored event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    New,
    Updated,
    Inactive,
    Imported,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Updated => "updated",
            Self::Inactive => "inactive",
            Self::Imported => "imported",
        }
    }
}

/// A persisted event record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredEvent {
    pub title: String,
    pub date: String,
    pub venue: String,
    pub city: String,
    pub description: String,
    pub image: String,
    pub source_url: String,
    pub source_name: String,

    pub fingerprint: String,
    pub status: EventStatus,

    /// Set when the record has been promoted into a downstream system.
    /// The scraper never sets or clears this flag itself.
    #[serde(default)]
    pub is_imported: bool,

    /// Last time a pass saw this record on the page
    pub last_scraped_at: DateTime<Utc>,

    /// When the record was promoted downstream, if ever
    #[serde(default)]
    pub imported_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl StoredEvent {
    /// Build a fresh record from a candidate not seen before.
    pub fn from_candidate(candidate: &SyncCandidate, now: DateTime<Utc>) -> Self {
        let e = &candidate.event;
        Self {
            title: e.title.clone(),
            date: e.date.clone(),
            venue: e.venue.clone(),
            city: e.city.clone(),
            description: e.description.clone(),
            image: e.image.clone(),
            source_url: e.source_url.clone(),
            source_name: e.source_name.clone(),
            fingerprint: candidate.fingerprint.clone(),
            status: EventStatus::New,
            is_imported: false,
            last_scraped_at: now,
            imported_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrite scraped content with a changed candidate.
    ///
    /// City is treated as a configured constant rather than scraped content
    /// and is left alone. The imported flag and its timestamp survive so a
    /// promoted record is not silently demoted.
    pub fn apply_update(&mut self, candidate: &SyncCandidate, now: DateTime<Utc>) {
        let e = &candidate.event;
        self.title = e.title.clone();
        self.date = e.date.clone();
        self.venue = e.venue.clone();
        self.description = e.description.clone();
        self.image = e.image.clone();
        self.fingerprint = candidate.fingerprint.clone();
        self.status = EventStatus::Updated;
        self.last_scraped_at = now;
    }
}
