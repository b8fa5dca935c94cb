//! Cache Facade Module
//!
//! The public operation set: Set, Get, Delete, SaveToken, Ping, GetKeys and
//! ClearKeys, applied through a [`NamespacedHandle`].

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::{NamespacedHandle, TOKEN_TTL};
use crate::config::Config;
use crate::context::CallContext;
use crate::error::{CacheError, Result, StoreError};
use crate::store::{KeyValueStore, MemoryStore, RedisStore, ScanCursor};

/// Aggregate outcome of [`Cache::clear_keys`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PurgeReport {
    /// Keys returned by the enumeration step
    pub scanned: usize,
    /// Keys the store reported as removed by the batch
    pub deleted: u64,
}

// == Cache ==
/// Namespaced, TTL-aware view of a backing key-value store.
///
/// Every call round-trips to the store; nothing is cached in process.
/// Clones share the handle and therefore the connection.
#[derive(Debug, Clone)]
pub struct Cache {
    handle: NamespacedHandle,
}

impl Cache {
    pub fn new(handle: NamespacedHandle) -> Self {
        Self { handle }
    }

    /// Connects to Redis and builds a cache from `config`.
    ///
    /// # Errors
    /// Returns [`CacheError::Connection`] if the store cannot be reached.
    pub async fn connect(config: &Config) -> Result<Self> {
        let store = RedisStore::connect(config).await?;
        Ok(Self::new(NamespacedHandle::from_config(
            Arc::new(store),
            config,
        )))
    }

    /// Builds a cache over a fresh in-process store.
    pub fn local(prefix: impl Into<String>) -> Self {
        Self::new(NamespacedHandle::new(Arc::new(MemoryStore::new()), prefix))
    }

    pub fn handle(&self) -> &NamespacedHandle {
        &self.handle
    }

    fn store(&self) -> &Arc<dyn KeyValueStore> {
        self.handle.store()
    }

    // == Set ==
    /// Stores `value` under `name`.
    ///
    /// `ttl` overrides the handle's default TTL; when both are absent the
    /// entry never expires. Returns once the store has acknowledged the write.
    pub async fn set(
        &self,
        ctx: &CallContext,
        name: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let key = self.handle.qualified_key(name)?;
        let ttl = ttl.or(self.handle.default_ttl());
        self.write(ctx, "set", &key, value, ttl).await
    }

    // == Save Token ==
    /// Stores `value` under `name` with the fixed one-day [`TOKEN_TTL`].
    pub async fn save_token(&self, ctx: &CallContext, name: &str, value: &str) -> Result<()> {
        let key = self.handle.qualified_key(name)?;
        self.write(ctx, "save_token", &key, value, Some(TOKEN_TTL))
            .await
    }

    async fn write(
        &self,
        ctx: &CallContext,
        op: &'static str,
        key: &str,
        value: &str,
        ttl: Option<Duration>,
    ) -> Result<()> {
        ctx.run(op, self.store().set(key, value, ttl))
            .await?
            .map_err(|source| self.store_error(op, key, source))?;
        debug!(key, ?ttl, "{} stored", op);
        Ok(())
    }

    // == Get ==
    /// Returns the value stored under `name`.
    ///
    /// # Errors
    /// Returns [`CacheError::NotFound`] if the key is absent or expired.
    pub async fn get(&self, ctx: &CallContext, name: &str) -> Result<String> {
        let key = self.handle.qualified_key(name)?;
        let value = ctx
            .run("get", self.store().get(&key))
            .await?
            .map_err(|source| self.store_error("get", &key, source))?;

        match value {
            Some(value) => {
                debug!(key = %key, "cache hit");
                Ok(value)
            }
            None => {
                debug!(key = %key, "cache miss");
                Err(CacheError::NotFound { key })
            }
        }
    }

    // == Delete ==
    /// Removes `name`. Deleting an absent key succeeds.
    pub async fn delete(&self, ctx: &CallContext, name: &str) -> Result<()> {
        let key = self.handle.qualified_key(name)?;
        let removed = ctx
            .run("delete", self.store().delete(&key))
            .await?
            .map_err(|source| self.store_error("delete", &key, source))?;
        debug!(key = %key, removed, "delete");
        Ok(())
    }

    // == Ping ==
    /// Liveness probe. Any failure, including the context expiring, is
    /// reported as `false` rather than an error.
    pub async fn ping(&self, ctx: &CallContext) -> bool {
        match ctx.run("ping", self.store().ping()).await {
            Ok(Ok(())) => true,
            Ok(Err(err)) => {
                warn!(store = %self.store().target(), error = %err, "ping failed");
                false
            }
            Err(err) => {
                warn!(store = %self.store().target(), error = %err, "ping interrupted");
                false
            }
        }
    }

    // == Get Keys ==
    /// Lists every key in the store, across all namespaces.
    ///
    /// Walks the cursor-paginated key space until the store returns the end
    /// cursor. Pages may be empty before that. Order is unspecified.
    ///
    /// # Errors
    /// Returns [`CacheError::Enumeration`] if any page fetch fails; keys
    /// gathered so far are discarded.
    pub async fn get_keys(&self, ctx: &CallContext) -> Result<Vec<String>> {
        let count = self.handle.scan_page_size();
        let mut cursor = ScanCursor::START;
        let mut keys = Vec::new();
        let mut pages = 0usize;

        loop {
            let page = ctx
                .run("get_keys", self.store().scan(cursor, count))
                .await?
                .map_err(|source| CacheError::Enumeration {
                    cursor: cursor.value(),
                    pages,
                    source,
                })?;
            pages += 1;
            keys.extend(page.keys);
            cursor = page.next;

            if cursor.is_end() {
                break;
            }
        }

        debug!(keys = keys.len(), pages, "key enumeration finished");
        Ok(keys)
    }

    /// Lists the logical names stored under this handle's prefix.
    pub async fn namespace_keys(&self, ctx: &CallContext) -> Result<Vec<String>> {
        let marker = self.handle.namespace_marker();
        let keys = self.get_keys(ctx).await?;
        Ok(keys
            .into_iter()
            .filter_map(|key| key.strip_prefix(&marker).map(str::to_string))
            .collect())
    }

    // == Clear Keys ==
    /// Deletes every key returned by [`Cache::get_keys`] in one pipelined batch.
    ///
    /// Not atomic: keys written while the scan runs may or may not be purged.
    /// If the context fires while the batch is in flight, the store may
    /// already have removed some of the keys. Nothing is retried or rolled back.
    pub async fn clear_keys(&self, ctx: &CallContext) -> Result<PurgeReport> {
        let keys = self.get_keys(ctx).await?;
        if keys.is_empty() {
            debug!("clear_keys: nothing to delete");
            return Ok(PurgeReport::default());
        }

        let deleted = ctx
            .run("clear_keys", self.store().delete_many(&keys))
            .await?
            .map_err(|source| {
                self.store_error("clear_keys", &format!("{} keys", keys.len()), source)
            })?;

        let report = PurgeReport {
            scanned: keys.len(),
            deleted,
        };
        info!(scanned = report.scanned, deleted = report.deleted, "purged keys");
        Ok(report)
    }

    fn store_error(&self, op: &'static str, key: &str, source: StoreError) -> CacheError {
        warn!(op, key, error = %source, "store request failed");
        if source.is_connection() {
            CacheError::Connection {
                target: self.store().target(),
                op,
                key: Some(key.to_string()),
                source,
            }
        } else {
            CacheError::Store {
                op,
                key: key.to_string(),
                source,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn cache_with_store(prefix: &str) -> (Cache, MemoryStore) {
        let store = MemoryStore::new();
        let handle = NamespacedHandle::new(Arc::new(store.clone()), prefix);
        (Cache::new(handle), store)
    }

    #[tokio::test]
    async fn test_set_and_get() {
        let cache = Cache::local("app");
        let ctx = CallContext::background();

        cache
            .set(&ctx, "key", "val", Some(Duration::from_secs(60)))
            .await
            .unwrap();
        assert_eq!(cache.get(&ctx, "key").await.unwrap(), "val");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let cache = Cache::local("app");
        let err = cache
            .get(&CallContext::background(), "missing")
            .await
            .unwrap_err();
        match err {
            CacheError::NotFound { key } => assert_eq!(key, "app_missing"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_writes_use_qualified_key() {
        let (cache, store) = cache_with_store("auth");
        let ctx = CallContext::background();

        cache.set(&ctx, "user:7", "x", None).await.unwrap();
        assert_eq!(store.get("auth_user:7").await.unwrap().as_deref(), Some("x"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_default_ttl_applies_when_omitted() {
        let store = MemoryStore::new();
        let handle = NamespacedHandle::new(Arc::new(store.clone()), "p")
            .with_default_ttl(Duration::from_secs(10));
        let cache = Cache::new(handle);
        let ctx = CallContext::background();

        cache.set(&ctx, "a", "1", None).await.unwrap();
        cache
            .set(&ctx, "b", "2", Some(Duration::from_secs(100)))
            .await
            .unwrap();

        assert_eq!(store.ttl_remaining("p_a").await, Some(Duration::from_secs(10)));
        assert_eq!(store.ttl_remaining("p_b").await, Some(Duration::from_secs(100)));
    }

    #[tokio::test]
    async fn test_no_ttl_anywhere_persists() {
        let (cache, store) = cache_with_store("p");
        cache
            .set(&CallContext::background(), "k", "v", None)
            .await
            .unwrap();
        assert!(store.get("p_k").await.unwrap().is_some());
        assert_eq!(store.ttl_remaining("p_k").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_save_token_uses_one_day() {
        let store = MemoryStore::new();
        let handle = NamespacedHandle::new(Arc::new(store.clone()), "p")
            .with_default_ttl(Duration::from_secs(5));
        let cache = Cache::new(handle);
        let ctx = CallContext::background();

        cache.save_token(&ctx, "refresh", "tok").await.unwrap();

        assert_eq!(
            store.ttl_remaining("p_refresh").await,
            Some(Duration::from_secs(86_400))
        );

        tokio::time::advance(Duration::from_secs(86_399)).await;
        assert_eq!(cache.get(&ctx, "refresh").await.unwrap(), "tok");

        tokio::time::advance(Duration::from_secs(1)).await;
        assert!(cache.get(&ctx, "refresh").await.unwrap_err().is_not_found());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unrepresentable_ttl_is_stored_without_expiry() {
        let (cache, store) = cache_with_store("p");
        let ctx = CallContext::background();

        cache
            .set(&ctx, "k", "v", Some(Duration::from_secs(u64::MAX)))
            .await
            .unwrap();

        assert_eq!(cache.get(&ctx, "k").await.unwrap(), "v");
        assert_eq!(store.ttl_remaining("p_k").await, None);
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let cache = Cache::local("p");
        let ctx = CallContext::background();

        cache.set(&ctx, "k", "v", None).await.unwrap();
        cache.delete(&ctx, "k").await.unwrap();
        cache.delete(&ctx, "k").await.unwrap();
        cache.delete(&ctx, "never").await.unwrap();
        assert!(cache.get(&ctx, "k").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_empty_name_rejected_before_store() {
        let (cache, store) = cache_with_store("p");
        let ctx = CallContext::background();

        assert!(matches!(
            cache.set(&ctx, "", "v", None).await,
            Err(CacheError::InvalidName)
        ));
        assert!(matches!(cache.get(&ctx, "").await, Err(CacheError::InvalidName)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_ping_local_store() {
        assert!(Cache::local("p").ping(&CallContext::background()).await);
    }

    #[tokio::test]
    async fn test_ping_cancelled_context_is_false() {
        let ctx = CallContext::background();
        ctx.cancel();
        assert!(!Cache::local("p").ping(&ctx).await);
    }

    #[tokio::test]
    async fn test_get_keys_spans_pages() {
        let store = MemoryStore::new();
        let handle = NamespacedHandle::new(Arc::new(store), "p").with_scan_page_size(2);
        let cache = Cache::new(handle);
        let ctx = CallContext::background();

        for name in ["a", "b", "c"] {
            cache.set(&ctx, name, "v", None).await.unwrap();
        }

        let keys: HashSet<String> = cache.get_keys(&ctx).await.unwrap().into_iter().collect();
        let expected: HashSet<String> = ["p_a", "p_b", "p_c"].iter().map(|k| k.to_string()).collect();
        assert_eq!(keys, expected);
    }

    #[tokio::test]
    async fn test_get_keys_is_not_filtered_by_prefix() {
        let store = Arc::new(MemoryStore::new());
        let ours = Cache::new(NamespacedHandle::new(store.clone(), "ours"));
        let theirs = Cache::new(NamespacedHandle::new(store, "theirs"));
        let ctx = CallContext::background();

        ours.set(&ctx, "a", "1", None).await.unwrap();
        theirs.set(&ctx, "b", "2", None).await.unwrap();

        assert_eq!(ours.get_keys(&ctx).await.unwrap().len(), 2);
        assert_eq!(ours.namespace_keys(&ctx).await.unwrap(), vec!["a".to_string()]);
        assert_eq!(theirs.namespace_keys(&ctx).await.unwrap(), vec!["b".to_string()]);
    }

    #[tokio::test]
    async fn test_clear_keys_empties_store() {
        let (cache, store) = cache_with_store("p");
        let ctx = CallContext::background();
        for i in 0..5 {
            cache.set(&ctx, &format!("k{i}"), "v", None).await.unwrap();
        }

        let report = cache.clear_keys(&ctx).await.unwrap();
        assert_eq!(report, PurgeReport { scanned: 5, deleted: 5 });
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_clear_keys_on_empty_store() {
        let cache = Cache::local("p");
        let report = cache.clear_keys(&CallContext::background()).await.unwrap();
        assert_eq!(report, PurgeReport::default());
    }

    #[test]
    fn test_purge_report_serializes() {
        let json = serde_json::to_string(&PurgeReport { scanned: 3, deleted: 2 }).unwrap();
        assert_eq!(json, r#"{"scanned":3,"deleted":2}"#);
    }
}
