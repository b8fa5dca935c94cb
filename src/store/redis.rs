//! Redis backing store
//!
//! Implements [`KeyValueStore`] over a single multiplexed connection that is
//! cloned per call, so every handle sharing a `RedisStore` shares one socket.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::{Client, ConnectionInfo, IntoConnectionInfo};
use tokio::time::timeout;
use tracing::{info, warn};

use super::{expiry_millis, KeyValueStore, ScanCursor, ScanPage};
use crate::config::Config;
use crate::error::{CacheError, Result, StoreError, StoreResult};

/// Redis-backed store sharing one multiplexed connection.
#[derive(Clone)]
pub struct RedisStore {
    conn: MultiplexedConnection,
    target: String,
}

impl RedisStore {
    /// Connects to the store described by `config`.
    ///
    /// # Errors
    /// Returns [`CacheError::Connection`] if the address is malformed, the
    /// server is unreachable, authentication fails, or no connection is
    /// established within `config.connect_timeout()`.
    pub async fn connect(config: &Config) -> Result<Self> {
        let target = config.target();
        let connect_err = |source: StoreError| CacheError::Connection {
            target: target.clone(),
            op: "connect",
            key: None,
            source,
        };

        let client = Client::open(connection_info(config).map_err(|e| connect_err(e.into()))?)
            .map_err(|e| connect_err(e.into()))?;

        let conn = timeout(
            config.connect_timeout(),
            client.get_multiplexed_async_connection(),
        )
        .await
        .map_err(|_| {
            connect_err(StoreError::Connection(format!(
                "no connection within {:?}",
                config.connect_timeout()
            )))
        })?
        .map_err(|e| connect_err(e.into()))?;

        info!(addr = %target, "Redis connection established");
        Ok(Self { conn, target })
    }

    /// Wraps an already established connection, e.g. one owned by the caller.
    pub fn from_connection(conn: MultiplexedConnection, target: impl Into<String>) -> Self {
        Self {
            conn,
            target: target.into(),
        }
    }
}

/// Builds connection info from parts so credentials never need URL escaping.
fn connection_info(config: &Config) -> redis::RedisResult<ConnectionInfo> {
    let mut info =
        format!("redis://{}:{}/{}", config.host, config.port, config.db).into_connection_info()?;
    info.redis.password = config.password.clone();
    Ok(info)
}

/// Keeps the UTF-8 keys of a SCAN page. Keys written as raw bytes by other
/// clients cannot be addressed through this API and are skipped.
fn decode_keys(raw: Vec<Vec<u8>>) -> Vec<String> {
    raw.into_iter()
        .filter_map(|bytes| match String::from_utf8(bytes) {
            Ok(key) => Some(key),
            Err(err) => {
                warn!(key = %String::from_utf8_lossy(err.as_bytes()), "skipping non-UTF-8 key");
                None
            }
        })
        .collect()
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Option<Duration>) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let mut cmd = redis::cmd("SET");
        cmd.arg(key).arg(value);
        if let Some(millis) = ttl.and_then(expiry_millis) {
            cmd.arg("PX").arg(millis);
        }
        let _: () = cmd.query_async(&mut conn).await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<u64> {
        let mut conn = self.conn.clone();
        let removed: u64 = redis::cmd("DEL").arg(key).query_async(&mut conn).await?;
        Ok(removed)
    }

    async fn scan(&self, cursor: ScanCursor, count: usize) -> StoreResult<ScanPage> {
        let mut conn = self.conn.clone();
        let (next, raw): (u64, Vec<Vec<u8>>) = redis::cmd("SCAN")
            .arg(cursor.value())
            .arg("COUNT")
            .arg(count.max(1))
            .query_async(&mut conn)
            .await?;
        Ok(ScanPage {
            keys: decode_keys(raw),
            next: ScanCursor::new(next),
        })
    }

    async fn delete_many(&self, keys: &[String]) -> StoreResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.conn.clone();
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.cmd("DEL").arg(key);
        }
        let removed: Vec<u64> = pipe.query_async(&mut conn).await?;
        Ok(removed.iter().sum())
    }

    async fn ping(&self) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        let pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        if pong == "PONG" {
            Ok(())
        } else {
            Err(StoreError::Command(format!("unexpected PING reply: {pong}")))
        }
    }

    fn target(&self) -> String {
        self.target.clone()
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("target", &self.target)
            .finish()
    }
}
