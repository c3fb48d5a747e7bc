// src/lib.rs

//! eventscout Library
//!
//! Scrapes event listings from a single source page with a headless browser,
//! extracts candidate records with DOM heuristics, and reconciles them
//! against a persistent store.

pub mod browser;
pub mod error;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod storage;
