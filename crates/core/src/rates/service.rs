//! Rate Cache Service.
//!
//! Reads quotes through a key-value store keyed by the full request, fetches
//! from the registered provider on a miss or forced refresh, and projects
//! staleness at read time.
//!
//! Concurrent cold misses for the same key each fetch; the last write wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;

use quotedesk_market_data::{MarketDataError, ProviderRegistry, Quote, QuoteRequest};

use super::config::RatesConfig;
use crate::errors::{Error, Result};
use crate::storage::KeyValueStore;

/// Rate cache operations.
#[async_trait]
pub trait RateServiceTrait: Send + Sync {
    /// Cached quote for `request`, fetching on a miss. With `force` the cache
    /// is bypassed and overwritten.
    async fn get_rate(&self, request: &QuoteRequest, force: bool) -> Result<Quote>;

    /// Cached quote with the staleness flag projected from the configured
    /// TTL and warn age.
    async fn get_display_rate(&self, request: &QuoteRequest) -> Result<Quote>;

    /// Force-refresh every request concurrently. Failures are logged with
    /// the request's name and cache key, never returned. Returns the number
    /// of requests that were refreshed.
    async fn warm_up(&self, requests: &[(String, QuoteRequest)]) -> usize;
}

/// Rate cache service over a [`KeyValueStore`] and a [`ProviderRegistry`].
pub struct RateService {
    store: Arc<dyn KeyValueStore>,
    registry: Arc<ProviderRegistry>,
    config: RatesConfig,
}

impl RateService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        registry: Arc<ProviderRegistry>,
        config: RatesConfig,
    ) -> Self {
        Self {
            store,
            registry,
            config,
        }
    }

    pub fn config(&self) -> &RatesConfig {
        &self.config
    }

    /// `rate:{source}:{method}:{geo}:{mode}:{depth}` with a missing depth
    /// written as `0`.
    pub fn cache_key(request: &QuoteRequest) -> String {
        format!(
            "rate:{}:{}:{}:{}:{}",
            request.source,
            request.method,
            request.geo,
            request.mode,
            request.depth.unwrap_or(0)
        )
    }

    /// Decoded entry under `key`. An entry that fails to decode is treated
    /// as absent.
    async fn cached(&self, key: &str) -> Result<Option<Quote>> {
        let Some(bytes) = self.store.get(key).await? else {
            return Ok(None);
        };

        match serde_json::from_slice::<Quote>(&bytes) {
            Ok(quote) => Ok(Some(quote)),
            Err(e) => {
                warn!("Discarding undecodable cache entry {}: {}", key, e);
                Ok(None)
            }
        }
    }

    async fn fetch_and_store(&self, request: &QuoteRequest, key: &str) -> Result<Quote> {
        let provider = self.registry.get(request.source).map_err(|e| match e {
            MarketDataError::ProviderNotConfigured(source) => Error::ProviderNotConfigured(source),
            other => Error::MarketData(other),
        })?;

        let rate = provider.fetch(request).await?;
        let ttl = self.config.ttl_for(request.source);
        let bytes = serde_json::to_vec(&rate.quote)?;
        self.store.set(key, &bytes, ttl).await?;

        debug!(
            "Cached {} = {} from {} (ttl {:?})",
            key,
            rate.quote.value,
            provider.id(),
            ttl
        );
        Ok(rate.quote)
    }
}

#[async_trait]
impl RateServiceTrait for RateService {
    async fn get_rate(&self, request: &QuoteRequest, force: bool) -> Result<Quote> {
        let key = Self::cache_key(request);

        if !force {
            if let Some(quote) = self.cached(&key).await? {
                return Ok(quote);
            }
        }

        self.fetch_and_store(request, &key).await
    }

    async fn get_display_rate(&self, request: &QuoteRequest) -> Result<Quote> {
        let quote = self.get_rate(request, false).await?;
        Ok(mark_stale(
            quote,
            self.config.ttl_for(request.source),
            self.config.warn_age(),
        ))
    }

    async fn warm_up(&self, requests: &[(String, QuoteRequest)]) -> usize {
        let results = join_all(requests.iter().map(|(name, request)| async move {
            match self.get_rate(request, true).await {
                Ok(_) => true,
                Err(e) => {
                    warn!(
                        "Failed to warm rate cache for {} ({}): {}",
                        name,
                        Self::cache_key(request),
                        e
                    );
                    false
                }
            }
        }))
        .await;

        let refreshed = results.into_iter().filter(|ok| *ok).count();
        info!("Warmed {}/{} rates", refreshed, requests.len());
        refreshed
    }
}

/// Flag `quote` stale as of now. See [`mark_stale_at`].
pub fn mark_stale(quote: Quote, ttl: Duration, warn_age: Duration) -> Quote {
    mark_stale_at(quote, ttl, warn_age, Utc::now())
}

/// Set `quote.stale` iff it is older than `warn_age` at `now` or its
/// `valid_until` has passed. Any incoming flag is overwritten.
///
/// `ttl` is the store's eviction window and does not affect the flag.
pub fn mark_stale_at(
    mut quote: Quote,
    _ttl: Duration,
    warn_age: Duration,
    now: DateTime<Utc>,
) -> Quote {
    // a timestamp in the future has no age
    let too_old = (now - quote.updated_at)
        .to_std()
        .map(|age| age > warn_age)
        .unwrap_or(false);
    let expired = quote.valid_until.is_some_and(|until| until < now);

    quote.stale = too_old || expired;
    quote
}
