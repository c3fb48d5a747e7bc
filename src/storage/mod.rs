// src/storage/mod.rs

//! Storage abstraction for persisted event records.

use async_trait::async_trait;

use crate::error::Result;
use crate::models::StoredEvent;

pub mod local;

pub use local::LocalStore;

/// Persistence contract the reconciliation engine runs against.
///
/// Records are keyed by source URL. Implementations must be safe to share
/// across tasks.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Look up a record by its source URL.
    async fn find_by_source_url(&self, source_url: &str) -> Result<Option<StoredEvent>>;

    /// Insert a new record. Fails if the source URL already exists.
    async fn create(&self, event: StoredEvent) -> Result<()>;

    /// Overwrite an existing record. Fails if the source URL is unknown.
    async fn save(&self, event: StoredEvent) -> Result<()>;

    /// Load all records, ordered by source URL.
    async fn load_all(&self) -> Result<Vec<StoredEvent>>;
}
