//! Cache Facade - namespaced, TTL-aware access to a remote key-value store
//!
//! Adds key namespacing, TTL policy and batched key operations on top of a
//! Redis-compatible store. Durability and protocol concerns stay with the store.

pub mod cache;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod store;
pub mod tasks;

pub use cache::{Cache, NamespacedHandle, PurgeReport, TOKEN_TTL};
pub use config::Config;
pub use context::CallContext;
pub use error::{CacheError, Result, StoreError};
pub use store::{KeyValueStore, MemoryStore, RedisStore, ScanCursor, ScanPage};
pub use tasks::spawn_cleanup_task;
