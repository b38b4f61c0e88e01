//! Rate provider abstractions and implementations.
//!
//! This module contains:
//! - The `RateProvider` trait that all providers implement
//! - Orderbook math and shared response-shape recognizers
//! - The shared last-resort public rate chain
//! - Concrete provider implementations (Bybit, Rapira, Grinex)
//!
//! # Fallback order
//!
//! Each provider first tries its native endpoint shapes, then the generic
//! shapes every feed may answer with, and finally the [`PublicRateChain`].
//! Provenance of whichever tier answered is written into the quote extras.

mod traits;

pub mod bybit;
pub mod grinex;
pub mod orderbook;
pub mod public_chain;
pub mod rapira;
pub mod shapes;

use std::sync::Arc;

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::warn;

use crate::errors::MarketDataError;
use crate::models::{CachedRate, ExtraKey, Extras, Quote, QuoteRequest};
use crate::retry::{with_retry, RetryPolicy};
use crate::transport::HttpTransport;

// Re-exports
pub use bybit::BybitProvider;
pub use grinex::GrinexProvider;
pub use public_chain::{PublicRate, PublicRateChain, PUBLIC_RATE_ENDPOINTS};
pub use rapira::RapiraProvider;
pub use traits::RateProvider;

/// Transport plus retry policy: every network attempt a provider makes.
#[derive(Clone)]
pub struct Upstream {
    transport: Arc<dyn HttpTransport>,
    retry: RetryPolicy,
}

impl Upstream {
    pub fn new(transport: Arc<dyn HttpTransport>, retry: RetryPolicy) -> Self {
        Self { transport, retry }
    }

    /// GET `url` as JSON under the retry policy.
    pub async fn get_json(&self, url: &str) -> Result<Value, MarketDataError> {
        with_retry(&self.retry, || self.transport.get_json(url)).await
    }
}

/// A value read from one tier, before it becomes a quote.
pub(crate) struct Extraction {
    pub value: Decimal,
    pub raw: Value,
    pub endpoint: String,
    pub note: &'static str,
    pub extras: Extras,
}

impl Extraction {
    pub fn new(value: Decimal, raw: Value, endpoint: impl Into<String>, note: &'static str) -> Self {
        Self {
            value,
            raw,
            endpoint: endpoint.into(),
            note,
            extras: Extras::new(),
        }
    }

    pub fn with_extras(mut self, extras: Extras) -> Self {
        self.extras = extras;
        self
    }
}

/// Turn the outcome of a provider's own tiers into a quote, falling back to
/// the public rate chain when they failed.
pub(crate) async fn settle(
    provider_id: &str,
    request: &QuoteRequest,
    primary: Result<Extraction, MarketDataError>,
    public_chain: &PublicRateChain,
) -> Result<CachedRate, MarketDataError> {
    let (extraction, fallback) = match primary {
        Ok(extraction) => (extraction, false),
        Err(err) => {
            warn!(
                "{} endpoints failed for {}/{}: {}; using public rates",
                provider_id, request.source, request.method, err
            );
            let public = public_chain.fetch().await?;
            let extraction =
                Extraction::new(public.value, public.raw, public.endpoint, "public-no-key");
            (extraction, true)
        }
    };

    let mut extras = Extras::new()
        .with(ExtraKey::Endpoint, extraction.endpoint)
        .with(ExtraKey::Note, extraction.note);
    extras.extend(extraction.extras);
    if fallback {
        extras.insert(ExtraKey::Fallback, true);
    }

    let quote = Quote::new(request, extraction.value, extras);
    Ok(CachedRate::new(quote, extraction.raw))
}
