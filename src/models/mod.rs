// src/models/mod.rs

//! Domain models for the scraper application.

mod config;
mod event;

// Re-export all public types
pub use config::{BrowserConfig, Config, ExtractionConfig, SourceConfig};
pub use event::{EventStatus, ScrapedEvent, StoredEvent, SyncCandidate};
