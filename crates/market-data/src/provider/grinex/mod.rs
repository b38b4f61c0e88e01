//! Grinex rate provider.
//!
//! Grinex runs a Peatio-style exchange API, whose tickers come in three
//! shapes depending on the route:
//! - a list of tickers: `[{"ticker_id": "USDT_RUB", "bid": .., "ask": .., "last_price": ..}]`
//! - a map keyed by market id: `{"usdtrub": {"at": .., "ticker": {"buy": .., "sell": .., "last": ..}}}`
//! - a single market: `{"at": .., "ticker": {...}}`
//!
//! Anything else is read as a flattened rate or single price.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::shapes::{self, TickerFields};
use super::{settle, Extraction, PublicRateChain, RateProvider, Upstream};
use crate::errors::MarketDataError;
use crate::models::{CachedRate, ExtraKey, QuoteRequest, Source};

const PROVIDER_ID: &str = "GRINEX";

const TICKER: TickerFields = TickerFields {
    bid: &["buy", "bid"],
    ask: &["sell", "ask"],
    last: &["last", "last_price", "close"],
};

/// Keys a list entry may carry its market name under.
const MARKET_KEYS: [&str; 4] = ["ticker_id", "symbol", "market", "id"];

/// Grinex rate provider.
pub struct GrinexProvider {
    upstream: Upstream,
    endpoint: String,
    public_chain: Arc<PublicRateChain>,
}

impl GrinexProvider {
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

    async fn primary(&self) -> Result<Extraction, MarketDataError> {
        let raw = self.upstream.get_json(&self.endpoint).await?;

        if let Some((symbol, ticker)) = find_ticker(&raw)? {
            let (value, mut extras) = shapes::ticker_value(ticker, &TICKER)?;
            if let Some(symbol) = symbol {
                extras.insert(ExtraKey::Symbol, symbol);
            }
            debug!("Grinex native ticker -> {}", value);
            return Ok(
                Extraction::new(value, raw.clone(), self.endpoint.clone(), "native")
                    .with_extras(extras),
            );
        }

        let (value, note) = shapes::flat_or_price(&raw)?;
        Ok(Extraction::new(value, raw, self.endpoint.clone(), note))
    }
}

/// Locate the USDT/RUB ticker in any of the native shapes. `Ok(None)` means
/// the document isn't a native one; a native list without the pair is an
/// error.
fn find_ticker(data: &Value) -> Result<Option<(Option<String>, &Value)>, MarketDataError> {
    match data {
        Value::Array(items) => {
            let found = items.iter().find_map(|item| {
                let name = MARKET_KEYS
                    .iter()
                    .find_map(|key| item.get(*key).and_then(Value::as_str))?;
                shapes::is_target_pair(name).then(|| (name.to_string(), nested_ticker(item)))
            });
            match found {
                Some((name, ticker)) => Ok(Some((Some(name), ticker))),
                None => Err(MarketDataError::shape("USDT/RUB not found in Grinex ticker list")),
            }
        }
        Value::Object(map) => {
            if let Some(ticker) = map.get("ticker").filter(|t| t.is_object()) {
                return Ok(Some((None, ticker)));
            }
            Ok(map
                .iter()
                .find(|(market, entry)| {
                    shapes::is_target_pair(market)
                        && entry.get("ticker").is_some_and(Value::is_object)
                })
                .map(|(market, entry)| (Some(market.clone()), nested_ticker(entry))))
        }
        _ => Ok(None),
    }
}

/// The `ticker` object of an entry, or the entry itself when it is flat.
fn nested_ticker(entry: &Value) -> &Value {
    entry
        .get("ticker")
        .filter(|t| t.is_object())
        .unwrap_or(entry)
}

#[async_trait]
impl RateProvider for GrinexProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn source(&self) -> Source {
        Source::Grinex
    }

    async fn fetch(&self, request: &QuoteRequest) -> Result<CachedRate, MarketDataError> {
        request.ensure_supported()?;
        let primary = self.primary().await;
        settle(PROVIDER_ID, request, primary, &self.public_chain).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Method;
    use crate::provider::PUBLIC_RATE_ENDPOINTS;
    use crate::testing::StubTransport;
    use rust_decimal_macros::dec;
    use serde_json::json;

    const GRINEX: &str = "https://grinex.io/api/v2/tickers";

    fn provider(stub: &StubTransport) -> GrinexProvider {
        let chain = Arc::new(PublicRateChain::new(stub.upstream()));
        GrinexProvider::new(stub.upstream(), Some(GRINEX.to_string()), chain)
    }

    fn request() -> QuoteRequest {
        QuoteRequest::new(Source::Grinex, Method::Mid)
    }

    #[tokio::test]
    async fn test_ticker_list() {
        let stub = StubTransport::new().json(
            GRINEX,
            json!([
                {"ticker_id": "BTC_RUB", "bid": "1", "ask": "2"},
                {"ticker_id": "USDT_RUB", "bid": "81.5", "ask": "81.7", "last_price": "81"}
            ]),
        );

        let rate = provider(&stub).fetch(&request()).await.unwrap();
        assert_eq!(rate.quote.value, dec!(81.6));
        assert_eq!(rate.quote.extras.text(ExtraKey::Symbol), Some("USDT_RUB"));
        assert_eq!(rate.quote.extras.text(ExtraKey::Note), Some("native"));
    }

    #[tokio::test]
    async fn test_market_map() {
        let stub = StubTransport::new().json(
            GRINEX,
            json!({
                "btcrub": {"at": 1, "ticker": {"buy": "1", "sell": "2"}},
                "usdtrub": {"at": 1, "ticker": {"buy": "80.1", "sell": "", "last": "80.3"}}
            }),
        );

        let rate = provider(&stub).fetch(&request()).await.unwrap();
        assert_eq!(rate.quote.value, dec!(80.3));
        assert_eq!(rate.quote.extras.text(ExtraKey::Symbol), Some("usdtrub"));
        assert_eq!(rate.quote.extras.decimal(ExtraKey::Bid), Some(dec!(80.1)));
    }

    #[tokio::test]
    async fn test_single_market() {
        let stub = StubTransport::new().json(
            GRINEX,
            json!({"at": 1, "ticker": {"buy": 79, "sell": 80}}),
        );

        let rate = provider(&stub).fetch(&request()).await.unwrap();
        assert_eq!(rate.quote.value, dec!(79.5));
        assert!(rate.quote.extras.text(ExtraKey::Symbol).is_none());
    }

    #[tokio::test]
    async fn test_generic_price() {
        let stub = StubTransport::new().json(GRINEX, json!({"price": "88.01"}));

        let rate = provider(&stub).fetch(&request()).await.unwrap();
        assert_eq!(rate.quote.value, dec!(88.01));
        assert_eq!(rate.quote.extras.text(ExtraKey::Note), Some("price"));
    }

    #[tokio::test]
    async fn test_http_failure_falls_back() {
        let stub = StubTransport::new()
            .status(GRINEX, 502)
            .json(PUBLIC_RATE_ENDPOINTS[0], json!({"rates": {"RUB": 90}}));

        let rate = provider(&stub).fetch(&request()).await.unwrap();
        assert_eq!(rate.quote.value, dec!(90));
        assert!(rate.quote.extras.is_fallback());
        assert_eq!(stub.calls_to(GRINEX), 3);
    }

    #[tokio::test]
    async fn test_overflowing_ticker_falls_back() {
        let max = "79228162514264337593543950335";
        let stub = StubTransport::new()
            .json(GRINEX, json!({"at": 1, "ticker": {"buy": max, "sell": max}}))
            .json(PUBLIC_RATE_ENDPOINTS[0], json!({"rates": {"RUB": 90}}));

        let rate = provider(&stub).fetch(&request()).await.unwrap();
        assert_eq!(rate.quote.value, dec!(90));
        assert!(rate.quote.extras.is_fallback());
    }
}
