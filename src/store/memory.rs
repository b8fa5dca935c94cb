//! In-process backing store
//!
//! [`MemoryStore`] implements [`KeyValueStore`] over a shared [`Keyspace`].
//! It stands in for Redis in local runs and tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{KeyValueStore, Keyspace, ScanCursor, ScanPage};
use crate::error::StoreResult;

/// Thread-safe in-process store. Clones share the same keyspace.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    keyspace: Arc<RwLock<Keyspace>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remaining TTL of a live key; `None` if it is missing or never expires.
    pub async fn ttl_remaining(&self, key: &str) -> Option<Duration> {
        self.keyspace
            .read()
            .await
            .entry(key)
            .and_then(|entry| entry.ttl_remaining())
    }

    /// Removes all expired entries, returning how many were dropped.
    pub async fn cleanup_expired(&self) -> usize {
        self.keyspace.write().await.cleanup_expired()
    }

    pub async fn len(&self) -> usize {
        self.keyspace.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.keyspace.read().await.is_empty()
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        Ok(self.keyspace.write().await.get(key))
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()> {
        let ttl = ttl.filter(|ttl| !ttl.is_zero());
        self.keyspace.write().await.set(key, value, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<u64> {
        Ok(u64::from(self.keyspace.write().await.delete(key)))
    }

    async fn scan(&self, cursor: ScanCursor, count: usize) -> StoreResult<ScanPage> {
        let (keys, next) = self.keyspace.read().await.scan(cursor.value(), count);
        Ok(ScanPage {
            keys,
            next: ScanCursor::new(next),
        })
    }

    async fn delete_many(&self, keys: &[String]) -> StoreResult<u64> {
        let mut keyspace = self.keyspace.write().await;
        let removed = keys.iter().filter(|key| keyspace.delete(key)).count();
        Ok(removed as u64)
    }

    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    fn target(&self) -> String {
        "memory".to_string()
    }
}
