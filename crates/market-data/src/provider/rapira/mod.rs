//! Rapira rate provider.
//!
//! The open API answers with a list of instruments:
//! `{"data": [{"symbol": "USDT/RUB", "askPrice": .., "bidPrice": .., "close": ..}]}`.
//! Endpoints that aren't Rapira are read as a flattened rate or single price.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::shapes::{self, TickerFields};
use super::{settle, Extraction, PublicRateChain, RateProvider, Upstream};
use crate::errors::MarketDataError;
use crate::models::{CachedRate, ExtraKey, QuoteRequest, Source};

const PROVIDER_ID: &str = "RAPIRA";

const TICKER: TickerFields = TickerFields {
    bid: &["bidPrice"],
    ask: &["askPrice"],
    last: &["close"],
};

/// Rapira rate provider.
pub struct RapiraProvider {
    upstream: Upstream,
    endpoint: String,
    public_chain: Arc<PublicRateChain>,
}

impl RapiraProvider {
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

        if let Some(Value::Array(items)) = raw.get("data") {
            let item = items
                .iter()
                .find(|item| item.is_object() && is_usdt_rub(item))
                .ok_or_else(|| MarketDataError::shape("USDT/RUB not found in Rapira data list"))?;

            let (value, mut extras) = shapes::ticker_value(item, &TICKER)?;
            if let Some(symbol) = item.get("symbol").and_then(Value::as_str) {
                extras.insert(ExtraKey::Symbol, symbol);
            }
            debug!("Rapira native ticker {:?} -> {}", item.get("symbol"), value);
            return Ok(
                Extraction::new(value, raw.clone(), self.endpoint.clone(), "native")
                    .with_extras(extras),
            );
        }

        let (value, note) = shapes::flat_or_price(&raw)?;
        Ok(Extraction::new(value, raw, self.endpoint.clone(), note))
    }
}

/// Match by symbol, or by base/quote currency in either orientation.
fn is_usdt_rub(item: &Value) -> bool {
    let symbol = item.get("symbol").and_then(Value::as_str).unwrap_or("");
    if shapes::is_target_pair(symbol) {
        return true;
    }

    let currency = |key: &str| {
        item.get(key)
            .and_then(Value::as_str)
            .map(|c| c.trim().to_ascii_uppercase())
            .unwrap_or_default()
    };
    let base = currency("baseCurrency");
    let quote = currency("quoteCurrency");
    matches!(
        (base.as_str(), quote.as_str()),
        ("USDT", "RUB") | ("RUB", "USDT")
    )
}

#[async_trait]
impl RateProvider for RapiraProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    fn source(&self) -> Source {
        Source::Rapira
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

    const RAPIRA: &str = "https://api.rapira.net/open/market/rates";

    fn provider(stub: &StubTransport) -> RapiraProvider {
        let chain = Arc::new(PublicRateChain::new(stub.upstream()));
        RapiraProvider::new(stub.upstream(), Some(RAPIRA.to_string()), chain)
    }

    fn request() -> QuoteRequest {
        QuoteRequest::new(Source::Rapira, Method::Mid)
    }

    #[tokio::test]
    async fn test_native_list() {
        let stub = StubTransport::new().json(
            RAPIRA,
            json!({"data": [
                {"symbol": "BTC/USDT", "askPrice": 60000, "bidPrice": 59990},
                {"symbol": "USDT/RUB", "askPrice": 82.43, "bidPrice": 82.42, "close": 82}
            ], "code": 0}),
        );

        let rate = provider(&stub).fetch(&request()).await.unwrap();
        assert_eq!(rate.quote.value, dec!(82.425));
        assert_eq!(rate.quote.source, Source::Rapira);
        assert_eq!(rate.quote.extras.text(ExtraKey::Symbol), Some("USDT/RUB"));
        assert_eq!(rate.quote.extras.decimal(ExtraKey::Ask), Some(dec!(82.43)));
        assert_eq!(rate.quote.extras.text(ExtraKey::Note), Some("native"));
        assert_eq!(rate.quote.extras.text(ExtraKey::Endpoint), Some(RAPIRA));
        assert!(!rate.quote.extras.is_fallback());
        assert_eq!(rate.quote.buy_sell(), (dec!(82.43), dec!(82.42)));
    }

    #[tokio::test]
    async fn test_native_match_by_currencies() {
        let stub = StubTransport::new().json(
            RAPIRA,
            json!({"data": [
                {"baseCurrency": "rub", "quoteCurrency": "usdt", "close": "81.9"}
            ]}),
        );

        let rate = provider(&stub).fetch(&request()).await.unwrap();
        assert_eq!(rate.quote.value, dec!(81.9));
        assert!(rate.quote.extras.text(ExtraKey::Symbol).is_none());
    }

    #[tokio::test]
    async fn test_flattened_rate() {
        let stub = StubTransport::new().json(RAPIRA, json!({"rates": {"RUB": 92}}));

        let rate = provider(&stub).fetch(&request()).await.unwrap();
        assert_eq!(rate.quote.value, dec!(92));
        assert_eq!(rate.quote.extras.text(ExtraKey::Note), Some("rates"));
    }

    #[tokio::test]
    async fn test_missing_pair_falls_back() {
        let stub = StubTransport::new()
            .json(RAPIRA, json!({"data": [{"symbol": "BTC/USDT", "close": 1}]}))
            .json(PUBLIC_RATE_ENDPOINTS[0], json!({"rates": {"RUB": 90.5}}));

        let rate = provider(&stub).fetch(&request()).await.unwrap();
        assert_eq!(rate.quote.value, dec!(90.5));
        assert!(rate.quote.extras.is_fallback());
        assert_eq!(rate.quote.extras.text(ExtraKey::Note), Some("public-no-key"));
        assert_eq!(rate.raw, json!({"rates": {"RUB": 90.5}}));
    }

    #[test]
    fn test_is_usdt_rub() {
        assert!(is_usdt_rub(&json!({"symbol": "usdt_rub"})));
        assert!(is_usdt_rub(&json!({"baseCurrency": "USDT", "quoteCurrency": "RUB"})));
        assert!(!is_usdt_rub(&json!({"baseCurrency": "USDT", "quoteCurrency": "EUR"})));
        assert!(!is_usdt_rub(&json!({})));
    }
}
