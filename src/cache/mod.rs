//! Cache Module
//!
//! Namespaced, TTL-aware facade over a [`KeyValueStore`](crate::store::KeyValueStore).

mod facade;
mod handle;


use std::time::Duration;

// Re-export public types
pub use facade::{Cache, PurgeReport};
pub use handle::{qualify, NamespacedHandle};

// == Public Constants ==
/// Separator placed between the namespace prefix and the logical name
pub const KEY_SEPARATOR: &str = "_";

/// Fixed expiry used by [`Cache::save_token`]: one day
pub const TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Default COUNT hint for each SCAN page
pub const DEFAULT_SCAN_PAGE_SIZE: usize = 100;
