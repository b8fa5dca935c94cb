//! Stored Entry Module
//!
//! A single value held by the in-process keyspace, with its expiry.

use std::time::Duration;

use tokio::time::Instant;

// == Stored Entry ==
/// A value kept by [`Keyspace`](super::Keyspace) together with its metadata.
#[derive(Debug, Clone)]
pub struct StoredEntry {
    /// The stored value
    pub value: String,
    /// Scan position; stays fixed across overwrites of the same key
    pub seq: u64,
    /// Expiration instant, None = no expiration
    pub expires_at: Option<Instant>,
}

impl StoredEntry {
    // == Constructor ==
    /// Creates a new entry with optional TTL.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `seq` - Position of the key in scan order
    /// * `ttl` - Optional time-to-live, measured from now
    ///
    /// A TTL too large to represent as an instant is treated as no expiration.
    pub fn new(value: String, seq: u64, ttl: Option<Duration>) -> Self {
        let now = Instant::now();
        Self {
            value,
            seq,
            expires_at: ttl.and_then(|ttl| now.checked_add(ttl)),
        }
    }

    // == Is Expired ==
    /// An entry is expired once the current time reaches its expiration
    /// instant, so a fully elapsed TTL is never readable.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }

    // == Time To Live ==
    /// Returns the remaining TTL, or None if no expiration is set.
    ///
    /// # Returns
    /// - `Some(Duration::ZERO)` if the TTL has elapsed
    /// - `Some(remaining)` if the entry has TTL and hasn't expired
    /// - `None` if the entry never expires
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|expires| expires.saturating_duration_since(Instant::now()))
    }
}
