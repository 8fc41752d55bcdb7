//! TTL-bounded decision cache keyed by snapshot fingerprint.
//!
//! Entries are value copies: `get` clones on the way out so callers can
//! set `from_cache` without corrupting the stored package.

use std::collections::HashMap;

use vanguard_core::decision::DecisionPackage;

#[derive(Debug)]
struct CacheEntry {
    timestamp_ms: i64,
    value: DecisionPackage,
}

#[derive(Debug)]
pub struct DecisionCache {
    ttl_ms: i64,
    table: HashMap<String, CacheEntry>,
}

impl DecisionCache {
    pub fn new(ttl_ms: i64) -> Self {
        Self {
            ttl_ms,
            table: HashMap::new(),
        }
    }

    /// Return a copy of the stored package if it is still within TTL.
    pub fn get(&self, key: &str, now_ms: i64) -> Option<DecisionPackage> {
        let entry = self.table.get(key)?;
        if now_ms - entry.timestamp_ms > self.ttl_ms {
            return None;
        }
        Some(entry.value.clone())
    }

    /// Store (or overwrite) a package under the key.
    pub fn put(&mut self, key: String, value: DecisionPackage, now_ms: i64) {
        self.table.insert(
            key,
            CacheEntry {
                timestamp_ms: now_ms,
                value,
            },
        );
    }

    /// Drop every expired entry.
    pub fn prune(&mut self, now_ms: i64) {
        let ttl_ms = self.ttl_ms;
        self.table
            .retain(|_, entry| now_ms - entry.timestamp_ms <= ttl_ms);
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}
