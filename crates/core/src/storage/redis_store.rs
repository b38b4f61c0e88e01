//! Redis-backed [`KeyValueStore`].

use async_trait::async_trait;
use log::debug;
use redis::aio::MultiplexedConnection;
use std::time::Duration;

use super::KeyValueStore;
use crate::errors::StoreError;

/// Store backed by a single multiplexed Redis connection.
///
/// The connection is cloned per command; clones share one socket.
#[derive(Clone)]
pub struct RedisStore {
    connection: MultiplexedConnection,
}

impl RedisStore {
    /// Connect to `url` (e.g. `redis://127.0.0.1:6379`).
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let client = redis::Client::open(url)
            .map_err(|e| StoreError::ConnectionFailed(format!("invalid redis url: {}", e)))?;
        let connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::ConnectionFailed(e.to_string()))?;
        debug!("Connected to redis");
        Ok(Self { connection })
    }
}

/// Redis rejects `EX 0`; anything below one second is stored for one second.
fn expiry_secs(ttl: Duration) -> u64 {
    ttl.as_secs().max(1)
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        let mut conn = self.connection.clone();
        let value: Option<Vec<u8>> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::CommandFailed(format!("GET {}: {}", key, e)))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self.connection.clone();
        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(expiry_secs(ttl))
            .query_async(&mut conn)
            .await
            .map_err(|e| StoreError::CommandFailed(format!("SET {}: {}", key, e)))?;
        Ok(())
    }
}
