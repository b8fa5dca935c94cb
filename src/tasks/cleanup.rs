//! TTL Cleanup Task
//!
//! Background task that periodically sweeps expired entries out of a
//! [`MemoryStore`]. Expired entries are already invisible to reads; the
//! sweep only reclaims their memory.

use std::time::Duration;

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::store::MemoryStore;

/// Spawns a task that removes expired entries from `store` every `interval`.
///
/// The task stops when `shutdown` is cancelled. It can also be aborted
/// through the returned handle.
///
/// # Example
/// ```ignore
/// let store = MemoryStore::new();
/// let shutdown = CancellationToken::new();
/// let sweeper = spawn_cleanup_task(store.clone(), Duration::from_secs(1), shutdown.clone());
/// // Later, during shutdown:
/// shutdown.cancel();
/// sweeper.await?;
/// ```
pub fn spawn_cleanup_task(
    store: MemoryStore,
    interval: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(?interval, "Starting TTL cleanup task");

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("TTL cleanup task stopped");
                    break;
                }
                _ = tokio::time::sleep(interval) => {}
            }

            let removed = store.cleanup_expired().await;
            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
