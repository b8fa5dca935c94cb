//! Backing Store Module
//!
//! Defines the contract the facade needs from a key-value store and the two
//! implementations shipped with the crate: Redis and an in-process keyspace.

mod entry;
mod keyspace;
mod memory;
mod redis;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::StoreResult;

pub use entry::StoredEntry;
pub use keyspace::Keyspace;
pub use memory::MemoryStore;
pub use self::redis::RedisStore;

// == Scan Cursor ==
/// Opaque continuation token of a cursor-paginated key scan.
///
/// The store hands out `0` both as the starting point and as the
/// end-of-space marker, matching the Redis SCAN protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ScanCursor(u64);

impl ScanCursor {
    /// Cursor that starts a fresh scan.
    pub const START: Self = Self(0);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// True when the store signalled there is nothing left to visit.
    pub fn is_end(self) -> bool {
        self.0 == 0
    }
}

/// One page of a key scan.
///
/// `keys` may be empty while `next` is still non-terminal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPage {
    pub keys: Vec<String>,
    pub next: ScanCursor,
}

// == Store Contract ==
/// Operations the facade issues against a backing key-value store.
///
/// Implementations must be safe to share between tasks; the facade holds
/// them behind an `Arc` and never serializes access itself.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Returns the value, or `None` when the key is absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    /// Writes `value`, replacing any previous value and expiry.
    /// `None` means the entry never expires.
    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()>;

    /// Removes the key, returning how many entries were removed (0 or 1).
    async fn delete(&self, key: &str) -> StoreResult<u64>;

    /// Fetches the page of keys that follows `cursor`. `count` is a hint.
    async fn scan(&self, cursor: ScanCursor, count: usize) -> StoreResult<ScanPage>;

    /// Deletes many keys in a single round trip, returning the number removed.
    async fn delete_many(&self, keys: &[String]) -> StoreResult<u64>;

    /// Liveness probe.
    async fn ping(&self) -> StoreResult<()>;

    /// Short description of where the store lives, for logs and errors.
    fn target(&self) -> String;
}

// == Expiry Conversion ==
/// Converts a TTL into the millisecond count sent on the wire.
///
/// Zero maps to `None` (no expiry). Positive durations shorter than a
/// millisecond round up to 1 so they still expire instead of persisting.
pub fn expiry_millis(ttl: Duration) -> Option<u64> {
    if ttl.is_zero() {
        return None;
    }
    let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
    Some(millis.max(1))
}
