use async_trait::async_trait;
use std::time::Duration;

use crate::errors::StoreError;

/// Storage interface for cached rates.
///
/// Values are opaque bytes. Expiry is enforced by the store: after `ttl` has
/// elapsed, `get` behaves as if the key was never set.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Value stored under `key`, if present and not expired.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Store `value` under `key`, replacing any previous value, and expire
    /// it after `ttl`.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), StoreError>;
}
