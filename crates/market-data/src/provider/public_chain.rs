//! Last-resort USD→RUB rate from public, no-key FX endpoints.
//!
//! USDT is treated as USD here. The endpoints are tried in a fixed order and
//! the first one answering with a recognizable shape wins.

use rust_decimal::Decimal;
use serde_json::Value;
use tracing::{debug, warn};

use super::shapes::{present, TARGET_CURRENCY};
use super::Upstream;
use crate::errors::MarketDataError;
use crate::models::coerce_decimal;

/// Public endpoints, in the order they are tried.
pub const PUBLIC_RATE_ENDPOINTS: [&str; 4] = [
    "https://api.exchangerate.host/latest?base=USD&symbols=RUB",
    "https://open.er-api.com/v6/latest/USD",
    "https://api.frankfurter.app/latest?from=USD&to=RUB",
    "https://cdn.jsdelivr.net/gh/fawazahmed0/currency-api@1/latest/currencies/usd/rub.json",
];

/// A rate read from the public chain.
#[derive(Clone, Debug)]
pub struct PublicRate {
    pub value: Decimal,
    pub raw: Value,
    pub endpoint: String,
}

/// Ordered list of public FX endpoints shared by every provider.
#[derive(Clone)]
pub struct PublicRateChain {
    upstream: Upstream,
    endpoints: Vec<String>,
}

impl PublicRateChain {
    /// Chain over [`PUBLIC_RATE_ENDPOINTS`].
    pub fn new(upstream: Upstream) -> Self {
        Self::with_endpoints(
            upstream,
            PUBLIC_RATE_ENDPOINTS.iter().map(|url| url.to_string()).collect(),
        )
    }

    pub fn with_endpoints(upstream: Upstream, endpoints: Vec<String>) -> Self {
        Self { upstream, endpoints }
    }

    pub fn endpoints(&self) -> &[String] {
        &self.endpoints
    }

    /// Fetch the first parseable rate.
    pub async fn fetch(&self) -> Result<PublicRate, MarketDataError> {
        let mut last_error = String::from("no endpoints configured");

        for url in &self.endpoints {
            let attempt = self
                .upstream
                .get_json(url)
                .await
                .and_then(|raw| Ok((parse_public_rate(&raw)?, raw)));

            match attempt {
                Ok((value, raw)) => {
                    debug!("Public rate {} from {}", value, url);
                    return Ok(PublicRate {
                        value,
                        raw,
                        endpoint: url.clone(),
                    });
                }
                Err(err) => {
                    debug!("Public rate endpoint {} failed: {}", url, err);
                    last_error = err.to_string();
                }
            }
        }

        warn!(
            "All {} public rate endpoints failed, last error: {}",
            self.endpoints.len(),
            last_error
        );
        Err(MarketDataError::PublicChainExhausted {
            attempted: self.endpoints.len(),
            last_error,
        })
    }
}

/// Recognize the known public FX shapes, in order: `rates.RUB`,
/// `result.RUB`, a flattened `rub`/`RUB` key, a generic `rate` field.
pub fn parse_public_rate(data: &Value) -> Result<Decimal, MarketDataError> {
    let lower = TARGET_CURRENCY.to_ascii_lowercase();

    let candidate = data
        .get("rates")
        .and_then(|rates| present(rates, TARGET_CURRENCY))
        .or_else(|| {
            data.get("result")
                .and_then(|result| present(result, TARGET_CURRENCY))
        })
        .or_else(|| present(data, &lower))
        .or_else(|| present(data, TARGET_CURRENCY))
        .or_else(|| present(data, "rate"));

    match candidate {
        Some(value) => coerce_decimal(value),
        None => Err(MarketDataError::shape("no known public rate shape")),
    }
}
