// src/pipeline/fingerprint.rs

//! Content fingerprinting for change detection.

use sha2::{Digest, Sha256};

/// Compute the content fingerprint of an event.
///
/// The fingerprint covers title and source URL only. A record whose title
/// changes gets a new fingerprint and is treated as changed; edits to date,
/// description or image alone do not trigger an update.
pub fn fingerprint(title: &str, source_url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(title.as_bytes());
    hasher.update(source_url.as_bytes());
    hex::encode(hasher.finalize())
}
