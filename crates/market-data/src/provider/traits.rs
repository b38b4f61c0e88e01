//! Rate provider trait definitions.

use async_trait::async_trait;

use crate::errors::MarketDataError;
use crate::models::{CachedRate, QuoteRequest, Source};

/// Trait for rate providers.
///
/// A provider resolves a [`QuoteRequest`] into a normalized quote through its
/// own ordered fallback chain. It must not let a single upstream outage
/// escape while any tier, including the shared public rate chain, still
/// succeeds.
///
/// # Example
///
/// ```ignore
/// use async_trait::async_trait;
/// use quotedesk_market_data::provider::RateProvider;
///
/// struct FixedProvider;
///
/// #[async_trait]
/// impl RateProvider for FixedProvider {
///     fn id(&self) -> &'static str {
///         "FIXED"
///     }
///
///     fn source(&self) -> Source {
///         Source::Rapira
///     }
///
///     async fn fetch(&self, request: &QuoteRequest) -> Result<CachedRate, MarketDataError> {
///         let quote = Quote::new(request, dec!(90), Extras::new());
///         Ok(CachedRate::new(quote, serde_json::Value::Null))
///     }
/// }
/// ```
#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "BYBIT", "RAPIRA", etc.
    /// Used for logging.
    fn id(&self) -> &'static str;

    /// The source this provider serves. The registry is keyed by it.
    fn source(&self) -> Source;

    /// Fetch and normalize the current rate.
    ///
    /// # Returns
    ///
    /// The quote plus the raw upstream body on success. Fails only for an
    /// unsupported method or when every tier, the public rate chain
    /// included, failed.
    async fn fetch(&self, request: &QuoteRequest) -> Result<CachedRate, MarketDataError>;
}
