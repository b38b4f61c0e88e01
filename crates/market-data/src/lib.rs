//! Quotedesk Market Data Crate
//!
//! This crate fetches USDT/RUB rates from upstream feeds and normalizes them
//! into [`Quote`]s for the quotedesk rate cache.
//!
//! # Overview
//!
//! The market data crate supports:
//! - Three feeds: Bybit, Rapira, Grinex
//! - Orderbook aggregation (VWAP over N levels, mid)
//! - A shared last-resort chain of public, no-key FX endpoints
//! - Bounded retry with jittered exponential backoff
//!
//! # Architecture
//!
//! ```text
//!                          +------------------+
//!                          |  QuoteRequest    |  (source, method, geo, mode, depth)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          | ProviderRegistry |  (source -> provider)
//!                          +------------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   RateProvider   |  (native tiers, then generic shapes)
//!                          +------------------+
//!                             |           |
//!                             v           v
//!                  +---------------+  +-----------------+
//!                  | HttpTransport |  | PublicRateChain |  (last resort)
//!                  +---------------+  +-----------------+
//!                                  |
//!                                  v
//!                          +------------------+
//!                          |   CachedRate     |  (quote + raw upstream body)
//!                          +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`QuoteRequest`] - What to fetch; every field is part of the cache key
//! - [`Quote`] - Normalized rate with provenance [`Extras`]
//! - [`CachedRate`] - Provider output: quote plus raw upstream document
//! - [`BidAsk`] - Two-sided quote, possibly synthetic
//! - [`MarketDataError`] - Error type, classified by [`RetryClass`]

pub mod errors;
pub mod models;
pub mod provider;
pub mod registry;
pub mod retry;
pub mod transport;

#[cfg(test)]
mod testing;

// Re-export error types
pub use errors::{MarketDataError, RetryClass};

// Re-export all public types from models
pub use models::{
    quantize, BidAsk, CachedRate, ExtraKey, ExtraValue, Extras, Geo, Method, Mode, Quote,
    QuoteRequest, Source,
};

// Re-export provider types
pub use provider::{
    BybitProvider, GrinexProvider, PublicRate, PublicRateChain, RapiraProvider, RateProvider,
    Upstream, PUBLIC_RATE_ENDPOINTS,
};

// Re-export registry types
pub use registry::{ProviderEndpoints, ProviderRegistry};

pub use retry::{with_retry, RetryPolicy};
pub use transport::{HttpTransport, ReqwestTransport};
