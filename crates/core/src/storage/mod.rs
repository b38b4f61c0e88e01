//! Key-value storage for cached rates.
//!
//! - [`KeyValueStore`] - The storage interface used by the rate service
//! - [`RedisStore`] - Redis implementation (`GET` / `SET .. EX`)
//! - [`MemoryStore`] - In-process implementation with per-entry expiry

mod memory_store;
mod redis_store;
mod store_traits;

pub use memory_store::MemoryStore;
pub use redis_store::RedisStore;
pub use store_traits::KeyValueStore;
