//! Bybit rate provider.
//!
//! When the configured endpoint is the public Bybit API the provider works
//! out USDT/RUB in three ways, in order:
//! 1. Cross-rate: BTCUSD (inverse) / BTCUSDT (linear) gives USD per USDT,
//!    multiplied by the public USD→RUB rate
//! 2. Spot USDTRUB orderbook (VWAP or mid), orderbook mode only
//! 3. Spot USDTRUB ticker (mid of bid1/ask1, else last price)
//!
//! Any other endpoint is fetched as a generic document (flattened rate,
//! `price`, or `{orderbook: {bids, asks}}`). Everything ends in the public
//! rate chain.

mod models;

use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::orderbook;
use super::shapes;
use super::{settle, Extraction, PublicRateChain, RateProvider, Upstream};
use crate::errors::MarketDataError;
use crate::models::{BidAsk, CachedRate, Method, Mode, QuoteRequest, Source};

use models::V5Response;

/// Provider ID constant
const PROVIDER_ID: &str = "BYBIT";

/// Host that switches the provider to its native strategies
const NATIVE_HOST: &str = "api.bybit.com";

const SPOT_SYMBOL: &str = "USDTRUB";
const LINEAR_SYMBOL: &str = "BTCUSDT";
const INVERSE_SYMBOL: &str = "BTCUSD";

/// Relative spread applied around the public rate when no book is readable.
fn synthetic_spread() -> Decimal {
    Decimal::new(1, 2)
}

/// Bybit rate provider.
///
/// # Example
///
/// ```ignore
/// use quotedesk_market_data::provider::{BybitProvider, PublicRateChain, Upstream};
///
/// let provider = BybitProvider::new(upstream.clone(), Some("https://api.bybit.com".into()), chain);
/// ```
pub struct BybitProvider {
    upstream: Upstream,
    endpoint: String,
    public_chain: Arc<PublicRateChain>,
}

impl BybitProvider {
    /// Create a provider. Without an endpoint the first public rate
    /// endpoint is used.
    pub fn new(
        upstream: Upstream,
        endpoint: Option<String>,
        public_chain: Arc<PublicRateChain>,
    ) -> Self {
        let endpoint = endpoint
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| super::PUBLIC_RATE_ENDPOINTS[0].to_string());
        Self {
            upstream,
            endpoint,
            public_chain,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn is_native(&self) -> bool {
        self.endpoint.contains(NATIVE_HOST)
    }

    fn base_url(&self) -> &str {
        self.endpoint.trim_end_matches('/')
    }

    fn tickers_url(&self, category: &str, symbol: &str) -> String {
        format!(
            "{}/v5/market/tickers?category={}&symbol={}",
            self.base_url(),
            category,
            symbol
        )
    }

    fn orderbook_url(&self, limit: usize) -> String {
        format!(
            "{}/v5/market/orderbook?category=spot&symbol={}&limit={}",
            self.base_url(),
            SPOT_SYMBOL,
            limit
        )
    }

    /// USD per USDT from the derivatives tickers, times public USD→RUB.
    async fn cross_rate(&self) -> Result<Extraction, MarketDataError> {
        let linear = self
            .upstream
            .get_json(&self.tickers_url("linear", LINEAR_SYMBOL))
            .await?;
        let inverse = self
            .upstream
            .get_json(&self.tickers_url("inverse", INVERSE_SYMBOL))
            .await?;

        let btc_usdt = V5Response::parse(&linear)?.last_price()?;
        let btc_usd = V5Response::parse(&inverse)?.last_price()?;
        if btc_usdt.is_zero() {
            return Err(MarketDataError::InvalidData(format!(
                "{} last price is zero",
                LINEAR_SYMBOL
            )));
        }
        let usd_per_usdt = btc_usd
            .checked_div(btc_usdt)
            .ok_or_else(|| MarketDataError::overflow("cross-rate"))?;

        let fx = self.public_chain.fetch().await?;
        let value = usd_per_usdt
            .checked_mul(fx.value)
            .ok_or_else(|| MarketDataError::overflow("cross-rate"))?;
        let raw = json!({ "linear": linear, "inverse": inverse, "fx": fx.raw });
        Ok(Extraction::new(
            value,
            raw,
            self.base_url(),
            "cross-rate",
        ))
    }

    /// Native strategies after the cross-rate: spot orderbook, then spot
    /// ticker. Only orderbook mode has a native fallback.
    async fn spot(&self, request: &QuoteRequest, depth: usize) -> Result<Extraction, MarketDataError> {
        if request.mode != Mode::Orderbook {
            return Err(MarketDataError::shape(format!(
                "mode {} has no spot fallback",
                request.mode
            )));
        }

        let orderbook_url = self.orderbook_url(depth);
        let from_book = match self.upstream.get_json(&orderbook_url).await {
            Ok(raw) => extract_v5_price(&raw, request.method, depth).map(|value| (value, raw)),
            Err(err) => Err(err),
        };
        match from_book {
            Ok((value, raw)) => return Ok(Extraction::new(value, raw, orderbook_url, "orderbook")),
            Err(err) => debug!("Bybit spot orderbook failed: {}", err),
        }

        let tickers_url = self.tickers_url("spot", SPOT_SYMBOL);
        let raw = self.upstream.get_json(&tickers_url).await?;
        let value = extract_v5_price(&raw, request.method, depth)?;
        Ok(Extraction::new(value, raw, tickers_url, "ticker"))
    }

    async fn native(&self, request: &QuoteRequest, depth: usize) -> Result<Extraction, MarketDataError> {
        match self.cross_rate().await {
            Ok(extraction) => Ok(extraction),
            Err(err) => {
                debug!("Bybit cross-rate failed: {}", err);
                self.spot(request, depth).await
            }
        }
    }

    async fn generic(&self, request: &QuoteRequest, depth: usize) -> Result<Extraction, MarketDataError> {
        let raw = self.upstream.get_json(&self.endpoint).await?;
        let (value, note) = shapes::generic_document(&raw, request.method, depth)?;
        Ok(Extraction::new(value, raw, self.endpoint.clone(), note))
    }

    async fn native_bid_ask(&self) -> Result<BidAsk, MarketDataError> {
        let orderbook_url = self.orderbook_url(1);
        let from_book = match self.upstream.get_json(&orderbook_url).await {
            Ok(raw) => extract_v5_bid_ask(&raw),
            Err(err) => Err(err),
        };
        match from_book {
            Ok((bid, ask)) => return Ok(BidAsk::new(bid, ask, orderbook_url)),
            Err(err) => debug!("Bybit spot orderbook failed for bid/ask: {}", err),
        }

        let tickers_url = self.tickers_url("spot", SPOT_SYMBOL);
        let raw = self.upstream.get_json(&tickers_url).await?;
        let (bid, ask) = extract_v5_bid_ask(&raw)?;
        Ok(BidAsk::new(bid, ask, tickers_url))
    }

    async fn generic_bid_ask(&self) -> Result<BidAsk, MarketDataError> {
        let raw = self.upstream.get_json(&self.endpoint).await?;
        let (bids, asks) = shapes::generic_orderbook(&raw)
            .ok_or_else(|| MarketDataError::shape("unsupported response format for endpoint"))??;
        let (bid, ask) = orderbook::top_of_book(&bids, &asks)?;
        Ok(BidAsk::new(bid, ask, self.endpoint.clone()))
    }

    /// Best bid and best ask.
    ///
    /// Resolves like [`fetch`](RateProvider::fetch). When no book is
    /// readable the pair is synthesized from the public rate with a ±1%
    /// spread and flagged `synthetic`. Fails only if the public rate chain
    /// fails too.
    pub async fn fetch_bid_ask(&self) -> Result<BidAsk, MarketDataError> {
        let primary = if self.is_native() {
            self.native_bid_ask().await
        } else {
            self.generic_bid_ask().await
        };

        match primary {
            Ok(pair) => Ok(pair),
            Err(err) => {
                warn!("Bybit bid/ask unavailable: {}; synthesizing from public rate", err);
                let public = self.public_chain.fetch().await?;
                Ok(BidAsk::synthetic(
                    public.value,
                    synthetic_spread(),
                    public.endpoint,
                ))
            }
        }
    }
}

/// Price from a v5 orderbook (`result.b`/`result.a`) or tickers
/// (`result.list`) response.
fn extract_v5_price(data: &Value, method: Method, depth: usize) -> Result<Decimal, MarketDataError> {
    let response = V5Response::parse(data)?;
    if let Some((bids, asks)) = response.book()? {
        return orderbook::aggregate(method, &bids, &asks, depth);
    }
    response.ticker_value()
}

fn extract_v5_bid_ask(data: &Value) -> Result<(Decimal, Decimal), MarketDataError> {
    let response = V5Response::parse(data)?;
    if let Some((bids, asks)) = response.book()? {
        return orderbook::top_of_book(&bids, &asks);
    }
    response.ticker_bid_ask()
}

#[async_trait]
impl RateProvider for BybitProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn source(&self) -> Source {
        Source::Bybit
    }

    async fn fetch(&self, request: &QuoteRequest) -> Result<CachedRate, MarketDataError> {
        request.ensure_supported()?;
        let depth = request.effective_depth();

        let primary = if self.is_native() {
            self.native(request, depth).await
        } else {
            self.generic(request, depth).await
        };

        settle(PROVIDER_ID, request, primary, &self.public_chain).await
    }
}
