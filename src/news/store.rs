//! Optional write-through of the latest result to an external key-value
//! store, for consumers outside this process.

use std::fmt;

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised by a snapshot store.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store connection failed: {0}")]
    Connection(String),

    #[error("store write failed: {0}")]
    Write(String),

    #[error("failed to encode snapshot: {0}")]
    Encode(String),
}

/// Key-value sink for serialized snapshots.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError>;
}

/// Redis-backed [`SnapshotStore`].
///
/// Uses a `ConnectionManager`, which reconnects on its own after failures.
#[derive(Clone)]
pub struct RedisSnapshotStore {
    conn_manager: ConnectionManager,
    redis_url: String,
}

impl fmt::Debug for RedisSnapshotStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisSnapshotStore")
            .field("redis_url", &self.redis_url)
            .finish_non_exhaustive()
    }
}

impl RedisSnapshotStore {
    /// Connect to Redis.
    pub async fn connect(redis_url: &str) -> Result<Self, StoreError> {
        let client =
            redis::Client::open(redis_url).map_err(|e| StoreError::Connection(e.to_string()))?;
        let conn_manager = ConnectionManager::new(client)
            .await
            .map_err(|e| StoreError::Connection(e.to_string()))?;
        info!("Connected snapshot store at {}", redis_url);

        Ok(Self {
            conn_manager,
            redis_url: redis_url.to_string(),
        })
    }
}

#[async_trait]
impl SnapshotStore for RedisSnapshotStore {
    async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
        let mut conn = self.conn_manager.clone();
        let bytes = value.len();
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(|e| StoreError::Write(e.to_string()))?;
        debug!(key, bytes, "Wrote snapshot to store");
        Ok(())
    }
}
