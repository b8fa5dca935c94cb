//! Namespaced Handle Module
//!
//! Holds the shared store connection and the namespacing policy that every
//! facade operation applies.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{DEFAULT_SCAN_PAGE_SIZE, KEY_SEPARATOR};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::store::KeyValueStore;

// == Namespaced Handle ==
/// A store connection plus an immutable key prefix and TTL policy.
///
/// Cloning is cheap and shares the underlying connection. The builder
/// methods consume the handle, so once it is shared nothing can change it.
#[derive(Clone)]
pub struct NamespacedHandle {
    store: Arc<dyn KeyValueStore>,
    prefix: Arc<str>,
    default_ttl: Option<Duration>,
    scan_page_size: usize,
}

impl NamespacedHandle {
    // == Constructor ==
    /// Creates a handle with no default TTL.
    ///
    /// # Arguments
    /// * `store` - Shared backing store connection
    /// * `prefix` - Namespace prefix; empty means "no namespace"
    pub fn new(store: Arc<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
        let prefix: String = prefix.into();
        Self {
            store,
            prefix: Arc::from(prefix),
            default_ttl: None,
            scan_page_size: DEFAULT_SCAN_PAGE_SIZE,
        }
    }

    /// Creates a handle using the prefix, default TTL and scan size from `config`.
    pub fn from_config(store: Arc<dyn KeyValueStore>, config: &Config) -> Self {
        let handle = Self::new(store, config.prefix.clone()).with_scan_page_size(config.scan_count);
        match config.default_ttl() {
            Some(ttl) => handle.with_default_ttl(ttl),
            None => handle,
        }
    }

    /// Sets the TTL applied to writes that do not pass their own.
    pub fn with_default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Sets the COUNT hint for each page of a key scan (at least 1).
    pub fn with_scan_page_size(mut self, size: usize) -> Self {
        self.scan_page_size = size.max(1);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn default_ttl(&self) -> Option<Duration> {
        self.default_ttl
    }

    pub fn scan_page_size(&self) -> usize {
        self.scan_page_size
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    // == Key Derivation ==
    /// Derives the store key for a logical name.
    ///
    /// # Errors
    /// Returns [`CacheError::InvalidName`] if `name` is empty.
    pub fn qualified_key(&self, name: &str) -> Result<String> {
        if name.is_empty() {
            return Err(CacheError::InvalidName);
        }
        Ok(qualify(&self.prefix, name))
    }

    /// The leading part every key of this namespace starts with.
    pub fn namespace_marker(&self) -> String {
        format!("{}{}", self.prefix, KEY_SEPARATOR)
    }
}

impl fmt::Debug for NamespacedHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamespacedHandle")
            .field("store", &self.store.target())
            .field("prefix", &self.prefix)
            .field("default_ttl", &self.default_ttl)
            .field("scan_page_size", &self.scan_page_size)
            .finish()
    }
}

/// Joins a prefix and a logical name into the key sent to the store.
pub fn qualify(prefix: &str, name: &str) -> String {
    format!("{prefix}{KEY_SEPARATOR}{name}")
}
