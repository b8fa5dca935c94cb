//! Store doubles shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use cache_facade::error::StoreResult;
use cache_facade::{KeyValueStore, MemoryStore, ScanCursor, ScanPage, StoreError};

/// A store whose network is down: every request fails with a connection error.
#[derive(Debug, Default)]
pub struct UnreachableStore;

fn down<T>() -> StoreResult<T> {
    Err(StoreError::Connection("connection refused".to_string()))
}

#[async_trait]
impl KeyValueStore for UnreachableStore {
    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        down()
    }
    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> StoreResult<()> {
        down()
    }
    async fn delete(&self, _key: &str) -> StoreResult<u64> {
        down()
    }
    async fn scan(&self, _cursor: ScanCursor, _count: usize) -> StoreResult<ScanPage> {
        down()
    }
    async fn delete_many(&self, _keys: &[String]) -> StoreResult<u64> {
        down()
    }
    async fn ping(&self) -> StoreResult<()> {
        down()
    }
    fn target(&self) -> String {
        "10.255.255.1:6379/0".to_string()
    }
}

/// A store that never answers.
#[derive(Debug, Default)]
pub struct HungStore;

async fn hang<T>() -> StoreResult<T> {
    std::future::pending().await
}

#[async_trait]
impl KeyValueStore for HungStore {
    async fn get(&self, _key: &str) -> StoreResult<Option<String>> {
        hang().await
    }
    async fn set(&self, _key: &str, _value: &str, _ttl: Option<Duration>) -> StoreResult<()> {
        hang().await
    }
    async fn delete(&self, _key: &str) -> StoreResult<u64> {
        hang().await
    }
    async fn scan(&self, _cursor: ScanCursor, _count: usize) -> StoreResult<ScanPage> {
        hang().await
    }
    async fn delete_many(&self, _keys: &[String]) -> StoreResult<u64> {
        hang().await
    }
    async fn ping(&self) -> StoreResult<()> {
        hang().await
    }
    fn target(&self) -> String {
        "hung".to_string()
    }
}

/// Serves scan pages from a fixed script and records the cursors asked for.
/// Everything else is delegated to an in-process store.
#[derive(Debug)]
pub struct ScriptedScanStore {
    pages: Vec<StoreResult<ScanPage>>,
    pub requested: Mutex<Vec<u64>>,
    pub batches: Mutex<Vec<Vec<String>>>,
    pub batch_result: Option<StoreError>,
    pub batch_hangs: bool,
    inner: MemoryStore,
}

impl ScriptedScanStore {
    pub fn new(pages: Vec<StoreResult<ScanPage>>) -> Self {
        Self {
            pages,
            requested: Mutex::new(Vec::new()),
            batches: Mutex::new(Vec::new()),
            batch_result: None,
            batch_hangs: false,
            inner: MemoryStore::new(),
        }
    }

    pub fn failing_batch(mut self, err: StoreError) -> Self {
        self.batch_result = Some(err);
        self
    }

    /// Records the batch, then never answers.
    pub fn hanging_batch(mut self) -> Self {
        self.batch_hangs = true;
        self
    }

    pub fn requested(&self) -> Vec<u64> {
        self.requested.lock().unwrap().clone()
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }
}

pub fn page(keys: &[&str], next: u64) -> StoreResult<ScanPage> {
    Ok(ScanPage {
        keys: keys.iter().map(|k| k.to_string()).collect(),
        next: ScanCursor::new(next),
    })
}

#[async_trait]
impl KeyValueStore for ScriptedScanStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key).await
    }
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()> {
        self.inner.set(key, value, ttl).await
    }
    async fn delete(&self, key: &str) -> StoreResult<u64> {
        self.inner.delete(key).await
    }
    async fn scan(&self, cursor: ScanCursor, _count: usize) -> StoreResult<ScanPage> {
        let index = {
            let mut requested = self.requested.lock().unwrap();
            requested.push(cursor.value());
            requested.len() - 1
        };
        self.pages
            .get(index)
            .cloned()
            .unwrap_or_else(|| Err(StoreError::Command("scan past script".to_string())))
    }
    async fn delete_many(&self, keys: &[String]) -> StoreResult<u64> {
        self.batches.lock().unwrap().push(keys.to_vec());
        if self.batch_hangs {
            return hang().await;
        }
        match &self.batch_result {
            Some(err) => Err(err.clone()),
            None => Ok(keys.len() as u64),
        }
    }
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }
    fn target(&self) -> String {
        "scripted".to_string()
    }
}

/// Wraps an in-process store and counts scan round trips.
#[derive(Debug, Default)]
pub struct CountingStore {
    pub inner: MemoryStore,
    pub scans: AtomicUsize,
    pub batches: AtomicUsize,
}

impl CountingStore {
    pub fn scans(&self) -> usize {
        self.scans.load(Ordering::SeqCst)
    }

    pub fn batches(&self) -> usize {
        self.batches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl KeyValueStore for CountingStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.inner.get(key).await
    }
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()> {
        self.inner.set(key, value, ttl).await
    }
    async fn delete(&self, key: &str) -> StoreResult<u64> {
        self.inner.delete(key).await
    }
    async fn scan(&self, cursor: ScanCursor, count: usize) -> StoreResult<ScanPage> {
        self.scans.fetch_add(1, Ordering::SeqCst);
        self.inner.scan(cursor, count).await
    }
    async fn delete_many(&self, keys: &[String]) -> StoreResult<u64> {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.inner.delete_many(keys).await
    }
    async fn ping(&self) -> StoreResult<()> {
        self.inner.ping().await
    }
    fn target(&self) -> String {
        self.inner.target()
    }
}
