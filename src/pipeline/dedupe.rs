// src/pipeline/dedupe.rs

//! Deduplication and candidate preparation.

use std::collections::HashSet;

use crate::models::{ScrapedEvent, SyncCandidate};
use crate::pipeline::fingerprint::fingerprint;

/// Deduplicate extracted events by source URL and stamp each survivor
/// with its fingerprint.
///
/// First occurrence wins; page order is preserved. Stops once `limit`
/// unique events have been collected.
pub fn dedupe_and_fingerprint(events: Vec<ScrapedEvent>, limit: usize) -> Vec<SyncCandidate> {
    let mut seen = HashSet::new();
    let mut candidates = Vec::new();

    for event in events {
        if candidates.len() >= limit {
            break;
        }
        if !seen.insert(event.source_url.clone()) {
            continue;
        }
        let fp = fingerprint(&event.title, &event.source_url);
        candidates.push(SyncCandidate {
            event,
            fingerprint: fp,
        });
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(title: &str, url: &str) -> ScrapedEvent {
        ScrapedEvent {
            title: title.to_string(),
            date: "Date TBA".to_string(),
            venue: "Sydney".to_string(),
            city: "Sydney".to_string(),
            description: String::new(),
            image: String::new(),
            source_url: url.to_string(),
            source_name: "What's On Sydney".to_string(),
        }
    }

    #[test]
    fn first_occurrence_wins_and_order_is_kept() {
        let events = vec![
            event("First", "https://ex.com/a"),
            event("Duplicate of first", "https://ex.com/a"),
            event("Second", "https://ex.com/b"),
        ];

        let candidates = dedupe_and_fingerprint(events, 20);

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].event.title, "First");
        assert_eq!(candidates[1].event.title, "Second");
    }

    #[test]
    fn respects_limit() {
        let events = (0..30)
            .map(|i| event(&format!("Event {i}"), &format!("https://ex.com/{i}")))
            .collect();

        let candidates = dedupe_and_fingerprint(events, 20);
        assert_eq!(candidates.len(), 20);
    }

    #[test]
    fn candidates_carry_fingerprints() {
        let candidates = dedupe_and_fingerprint(vec![event("A", "https://ex.com/a")], 20);
        assert_eq!(
            candidates[0].fingerprint,
            fingerprint("A", "https://ex.com/a")
        );
    }
}
