//! Request deduplication & structural equality helpers
//!
//! Used by the navigator to skip repeated resolutions and to avoid replacing state
//! with an identical value.

use crate::domain::Node;
use std::sync::Mutex;

/// Identifies one unit of resolution work
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DedupKey(String);

impl DedupKey {
    /// Key of a (base location, positional reference) pair
    pub fn for_location(base: &str, reference: Option<&str>) -> Self {
        Self(format!("{}|{}", base, reference.unwrap_or_default()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Remembers the key of the last run
#[derive(Debug, Default)]
pub struct KeyGuard {
    last: Mutex<Option<DedupKey>>,
}

impl KeyGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` as the latest run. Returns false if it equals the previous one.
    pub fn claim(&self, key: DedupKey) -> bool {
        let mut last = self.last.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if last.as_ref() == Some(&key) {
            return false;
        }
        *last = Some(key);
        true
    }
}

/// Two listings are the same when they hold the same ids in the same order
pub fn same_listing(current: &[Node], next: &[Node]) -> bool {
    current.len() == next.len() && current.iter().zip(next).all(|(a, b)| a.id == b.id)
}

/// Two selections are the same when they point at the same node id
pub fn same_selection(current: Option<&Node>, next: Option<&Node>) -> bool {
    current.map(|node| node.id.as_str()) == next.map(|node| node.id.as_str())
}
