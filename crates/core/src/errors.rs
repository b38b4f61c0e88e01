//! Core error types for quotedesk.
//!
//! Storage-specific errors (from Redis, etc.) are converted to [`StoreError`]
//! by the storage layer, keeping this type backend-agnostic.

use thiserror::Error;

use quotedesk_market_data::{MarketDataError, Source};

/// Type alias for Result using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Root error type for the rate cache.
#[derive(Error, Debug)]
pub enum Error {
    /// No provider is registered for the requested source. Raised before
    /// any network I/O.
    #[error("Provider for source {0} is not configured")]
    ProviderNotConfigured(Source),

    /// A provider failed, including its whole fallback chain. The inner
    /// error is passed through unchanged.
    #[error("Market data operation failed: {0}")]
    MarketData(#[from] MarketDataError),

    #[error("Cache store operation failed: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Backend-agnostic error type for key-value store operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to reach the store.
    #[error("Failed to connect to store: {0}")]
    ConnectionFailed(String),

    /// A command reached the store but failed.
    #[error("Store command failed: {0}")]
    CommandFailed(String),
}
