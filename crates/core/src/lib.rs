//! Quotedesk Core - Rate cache service and storage traits.
//!
//! This crate caches normalized rates produced by the `market-data` crate.
//! It is storage-agnostic: the service talks to a [`storage::KeyValueStore`],
//! with Redis and in-memory implementations provided.

pub mod errors;
pub mod rates;
pub mod storage;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
pub use errors::StoreError;
