//! Error types for the cache facade
//!
//! Provides unified error handling using thiserror. Backends raise
//! [`StoreError`]; the facade wraps it into [`CacheError`] with the
//! operation name and key attached.

use thiserror::Error;

// == Store Error Enum ==
/// Failure reported by a backing store implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached, refused us, or dropped the connection
    #[error("connection error: {0}")]
    Connection(String),

    /// The store answered but rejected or failed the command
    #[error("command error: {0}")]
    Command(String),
}

impl StoreError {
    /// Returns true if the failure is about reachability rather than the request.
    pub fn is_connection(&self) -> bool {
        matches!(self, StoreError::Connection(_))
    }
}

impl From<redis::RedisError> for StoreError {
    fn from(err: redis::RedisError) -> Self {
        let unreachable = err.is_io_error()
            || err.is_connection_refusal()
            || err.is_connection_dropped()
            || err.is_timeout()
            || err.kind() == redis::ErrorKind::AuthenticationFailed;

        if unreachable {
            StoreError::Connection(err.to_string())
        } else {
            StoreError::Command(err.to_string())
        }
    }
}

// == Cache Error Enum ==
/// Unified error type for the cache facade.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cannot reach or authenticate to the backing store
    #[error("{op} cannot reach store at {target}{}: {source}", key_suffix(.key))]
    Connection {
        target: String,
        op: &'static str,
        /// Store key of the failed request; None while connecting or scanning
        key: Option<String>,
        #[source]
        source: StoreError,
    },

    /// Key is absent or has expired
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// Store-side failure on an otherwise valid request
    #[error("{op} failed for {key}: {source}")]
    Store {
        op: &'static str,
        key: String,
        #[source]
        source: StoreError,
    },

    /// A page fetch failed while walking the key space
    #[error("key enumeration aborted at cursor {cursor} after {pages} page(s): {source}")]
    Enumeration {
        cursor: u64,
        pages: usize,
        #[source]
        source: StoreError,
    },

    /// Logical key names must be non-empty
    #[error("logical key name must not be empty")]
    InvalidName,

    /// The caller's cancellation token fired before the store answered
    #[error("{op} cancelled by caller")]
    Cancelled { op: &'static str },

    /// The caller's deadline passed before the store answered
    #[error("{op} timed out")]
    TimedOut { op: &'static str },
}

impl CacheError {
    /// Returns true for the expected miss case.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound { .. })
    }

    /// Returns true if the call was cut short by its [`CallContext`](crate::CallContext).
    pub fn is_interrupted(&self) -> bool {
        matches!(
            self,
            CacheError::Cancelled { .. } | CacheError::TimedOut { .. }
        )
    }
}

fn key_suffix(key: &Option<String>) -> String {
    key.as_ref().map(|k| format!(" for {k}")).unwrap_or_default()
}

// == Result Type Alias ==
/// Convenience Result type for the cache facade.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Result type returned by backing store implementations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;
