//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The main error enum for all rate fetching operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

use crate::models::{Method, Source};

/// Errors that can occur while fetching and normalizing rates.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which determines how the retry policy and the provider fallback
/// cascade should handle the error.
#[derive(Error, Debug)]
pub enum MarketDataError {
    /// The request never reached the upstream (connect, TLS, timeout, reset).
    /// Should retry with exponential backoff.
    #[error("Transport error: {url} - {message}")]
    Transport {
        /// The URL that was being fetched
        url: String,
        /// The transport error message
        message: String,
    },

    /// The upstream answered with a non-success HTTP status.
    /// Should retry with exponential backoff.
    #[error("HTTP {status}: {url}")]
    HttpStatus {
        /// The URL that was being fetched
        url: String,
        /// The HTTP status code
        status: u16,
    },

    /// The response body could not be decoded as JSON.
    #[error("Invalid response from {url}: {message}")]
    InvalidResponse {
        /// The URL that was being fetched
        url: String,
        /// The decode error message
        message: String,
    },

    /// A value that should be numeric could not be coerced to a decimal.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// The response was valid JSON but did not match any known shape.
    #[error("Unsupported response shape: {0}")]
    UnsupportedShape(String),

    /// One side of an orderbook had no levels.
    #[error("Orderbook is empty")]
    EmptyOrderbook,

    /// The levels taken for a VWAP summed to zero quantity.
    #[error("VWAP computation has zero quantity")]
    ZeroQuantity,

    /// The requested aggregation method has no extraction logic.
    #[error("Unsupported method: {0}")]
    UnsupportedMethod(Method),

    /// No provider is registered for the requested source.
    #[error("Provider for source {0} is not configured")]
    ProviderNotConfigured(Source),

    /// Every public rate endpoint failed or returned an unparseable shape.
    /// This is the last-resort tier; nothing is left to try.
    #[error("Failed to fetch public rate from {attempted} endpoints: {last_error}")]
    PublicChainExhausted {
        /// Number of endpoints attempted
        attempted: usize,
        /// Message of the last endpoint failure
        last_error: String,
    },
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// - [`RetryClass::WithBackoff`]: transport and HTTP status failures
    /// - [`RetryClass::NextTier`]: data errors, caught by the provider cascade
    /// - [`RetryClass::Never`]: configuration errors and exhaustion
    ///
    /// # Examples
    ///
    /// ```
    /// use quotedesk_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::HttpStatus { url: "https://x".to_string(), status: 502 };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::EmptyOrderbook;
    /// assert_eq!(error.retry_class(), RetryClass::NextTier);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::Transport { .. } | Self::HttpStatus { .. } => RetryClass::WithBackoff,

            Self::InvalidResponse { .. }
            | Self::InvalidData(_)
            | Self::UnsupportedShape(_)
            | Self::EmptyOrderbook
            | Self::ZeroQuantity => RetryClass::NextTier,

            Self::UnsupportedMethod(_)
            | Self::ProviderNotConfigured(_)
            | Self::PublicChainExhausted { .. } => RetryClass::Never,
        }
    }

    /// Shorthand for an [`UnsupportedShape`](Self::UnsupportedShape) error.
    pub(crate) fn shape(message: impl Into<String>) -> Self {
        Self::UnsupportedShape(message.into())
    }

    /// Arithmetic on upstream numbers left the representable range.
    pub(crate) fn overflow(what: &str) -> Self {
        Self::InvalidData(format!("{} overflowed", what))
    }
}
