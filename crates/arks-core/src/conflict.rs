//! Cross-artifact origin conflict detection.

use arks_schema::Item;
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// An origin produced by two different artifact directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    /// The duplicated origin.
    pub origin: String,
    /// Hex SHA-256 of the origin, as used for KV keys.
    pub hash: String,
    /// Directory that produced the origin first.
    pub first: String,
    /// Directory that produced it again.
    pub second: String,
}

/// Tracks origins by SHA-256 and reports collisions between owners.
#[derive(Debug, Default)]
pub struct ConflictChecker {
    seen: HashMap<[u8; 32], String>,
    conflicts: Vec<Conflict>,
}

impl ConflictChecker {
    /// Empty checker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `item` as produced by `owner`. Returns `false` if another
    /// owner produced the same origin earlier.
    pub fn check(&mut self, owner: &str, item: &Item) -> bool {
        let key: [u8; 32] = Sha256::digest(item.origin.as_bytes()).into();
        match self.seen.get(&key) {
            None => {
                self.seen.insert(key, owner.to_string());
                true
            }
            Some(first) if first == owner => true,
            Some(first) => {
                tracing::warn!(origin = %item.origin, %first, second = owner, "origin conflict");
                self.conflicts.push(Conflict {
                    origin: item.origin.clone(),
                    hash: hex::encode(key),
                    first: first.clone(),
                    second: owner.to_string(),
                });
                false
            }
        }
    }

    /// Number of distinct origins seen.
    pub fn origins(&self) -> usize {
        self.seen.len()
    }

    /// Conflicts found so far, in discovery order.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }
}
