//! Keyspace Module
//!
//! Synchronous storage engine behind [`MemoryStore`](super::MemoryStore):
//! a HashMap of entries plus a scan-order index for cursor pagination.

use std::collections::{BTreeMap, HashMap};
use std::time::Duration;

use tokio::time::Instant;

use super::StoredEntry;

// == Keyspace ==
/// Key-value storage with TTL expiry and cursor-based scanning.
///
/// Every key gets a sequence number when first written. The scan cursor is
/// the last sequence number handed out in a page, so keys that live for the
/// whole scan are returned exactly once no matter how the map changes.
#[derive(Debug, Default)]
pub struct Keyspace {
    /// Key-value storage
    entries: HashMap<String, StoredEntry>,
    /// Scan order: sequence number to key
    order: BTreeMap<u64, String>,
    /// Last sequence number assigned
    last_seq: u64,
}

impl Keyspace {
    pub fn new() -> Self {
        Self::default()
    }

    // == Set ==
    /// Stores a key-value pair with optional TTL.
    ///
    /// Overwriting replaces the value and resets the TTL but keeps the key's
    /// scan position.
    pub fn set(&mut self, key: &str, value: &str, ttl: Option<Duration>) {
        let seq = match self.entries.get(key) {
            Some(existing) => existing.seq,
            None => {
                self.last_seq += 1;
                self.order.insert(self.last_seq, key.to_string());
                self.last_seq
            }
        };

        self.entries
            .insert(key.to_string(), StoredEntry::new(value.to_string(), seq, ttl));
    }

    // == Get ==
    /// Retrieves a value by key. Expired entries are removed on access.
    pub fn get(&mut self, key: &str) -> Option<String> {
        let expired = self.entries.get(key)?.is_expired();
        if expired {
            self.remove(key);
            return None;
        }
        self.entries.get(key).map(|entry| entry.value.clone())
    }

    /// Returns the live entry for `key` without touching it.
    pub fn entry(&self, key: &str) -> Option<&StoredEntry> {
        self.entries.get(key).filter(|entry| !entry.is_expired())
    }

    // == Delete ==
    /// Removes an entry by key. Returns true if a live entry was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        match self.remove(key) {
            Some(entry) => !entry.is_expired(),
            None => false,
        }
    }

    // == Scan ==
    /// Returns up to `count` live keys positioned after `cursor`, plus the
    /// cursor to continue from (`0` once the end is reached).
    ///
    /// Expired entries still use up page slots, so a page can come back
    /// empty while the scan is not finished.
    pub fn scan(&self, cursor: u64, count: usize) -> (Vec<String>, u64) {
        let now = Instant::now();
        let budget = count.max(1);

        let mut keys = Vec::new();
        let mut visited = 0;
        let mut last = cursor;
        for (seq, key) in self.order.range(cursor.saturating_add(1)..) {
            if visited == budget {
                break;
            }
            visited += 1;
            last = *seq;

            let live = self
                .entries
                .get(key)
                .is_some_and(|entry| !entry.is_expired_at(now));
            if live {
                keys.push(key.clone());
            }
        }

        let more = self.order.range(last.saturating_add(1)..).next().is_some();
        let next = if more { last } else { 0 };
        (keys, next)
    }

    // == Cleanup Expired ==
    /// Removes all expired entries. Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = Instant::now();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            self.remove(key);
        }
        expired_keys.len()
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove(&mut self, key: &str) -> Option<StoredEntry> {
        let entry = self.entries.remove(key)?;
        self.order.remove(&entry.seq);
        Some(entry)
    }
}
