use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::extras::{ExtraKey, Extras};
use super::request::QuoteRequest;
use super::types::{Geo, Method, Mode, Source};
use crate::errors::MarketDataError;

/// Fractional digits every quote value is quantized to.
pub const VALUE_SCALE: u32 = 6;

/// Round half-up (away from zero on a tie) to [`VALUE_SCALE`] digits.
pub fn quantize(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(VALUE_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Parse a decimal from text, accepting plain and scientific notation.
pub fn parse_decimal(text: &str) -> Result<Decimal, MarketDataError> {
    let trimmed = text.trim();
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .map_err(|_| MarketDataError::InvalidData(format!("not a number: {:?}", text)))
}

/// Coerce a JSON scalar (number or numeric string) to a decimal.
pub fn coerce_decimal(value: &Value) -> Result<Decimal, MarketDataError> {
    match value {
        Value::Number(number) => {
            if let Some(int) = number.as_i64() {
                Ok(Decimal::from(int))
            } else if let Some(uint) = number.as_u64() {
                Ok(Decimal::from(uint))
            } else {
                parse_decimal(&number.to_string())
            }
        }
        Value::String(text) => parse_decimal(text),
        other => Err(MarketDataError::InvalidData(format!(
            "expected a number, got {}",
            other
        ))),
    }
}

fn deserialize_quantized<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    <Decimal as Deserialize>::deserialize(deserializer).map(quantize)
}

/// Normalized rate, as cached and handed to callers.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub source: Source,
    pub method: Method,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub geo: Geo,
    #[serde(default)]
    pub depth: Option<u32>,

    /// Always quantized to six fractional digits, half-up.
    #[serde(deserialize_with = "deserialize_quantized")]
    pub value: Decimal,

    /// Fetch time (UTC).
    pub updated_at: DateTime<Utc>,

    /// Optional absolute expiry reported alongside the value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,

    /// Read-time freshness projection. Never written to, nor read from,
    /// storage.
    #[serde(skip)]
    pub stale: bool,

    #[serde(default)]
    pub extras: Extras,
}

impl Quote {
    /// Create a quote for `request`, stamped now.
    pub fn new(request: &QuoteRequest, value: Decimal, extras: Extras) -> Self {
        Self {
            source: request.source,
            method: request.method,
            mode: request.mode,
            geo: request.geo,
            depth: request.depth,
            value: quantize(value),
            updated_at: Utc::now(),
            valid_until: None,
            stale: false,
            extras,
        }
    }

    /// Create a quote from a raw upstream scalar. Fails with a data error if
    /// the scalar isn't numeric.
    pub fn from_raw(
        request: &QuoteRequest,
        value: &Value,
        extras: Extras,
    ) -> Result<Self, MarketDataError> {
        Ok(Self::new(request, coerce_decimal(value)?, extras))
    }

    pub fn with_valid_until(mut self, valid_until: DateTime<Utc>) -> Self {
        self.valid_until = Some(valid_until);
        self
    }

    /// Prices to show for buying and selling: the native ask/bid when the
    /// upstream reported them, the single value otherwise.
    pub fn buy_sell(&self) -> (Decimal, Decimal) {
        let buy = self.extras.decimal(ExtraKey::Ask).unwrap_or(self.value);
        let sell = self.extras.decimal(ExtraKey::Bid).unwrap_or(self.value);
        (buy, sell)
    }
}

/// Provider output: the normalized quote plus the verbatim upstream body.
///
/// `raw` is diagnostics only and is never re-parsed.
#[derive(Clone, Debug)]
pub struct CachedRate {
    pub quote: Quote,
    pub raw: Value,
}

impl CachedRate {
    pub fn new(quote: Quote, raw: Value) -> Self {
        Self { quote, raw }
    }
}

/// Two-sided quote.
///
/// `synthetic` is set when no real book was readable and the pair was
/// derived from the public rate with a fixed spread. Callers decide how to
/// present such a pair.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BidAsk {
    pub bid: Decimal,
    pub ask: Decimal,
    pub synthetic: bool,
    pub endpoint: String,
}

impl BidAsk {
    pub fn new(bid: Decimal, ask: Decimal, endpoint: impl Into<String>) -> Self {
        Self {
            bid: quantize(bid),
            ask: quantize(ask),
            synthetic: false,
            endpoint: endpoint.into(),
        }
    }

    /// Pair derived from a single reference value: `value ∓ value * spread`,
    /// saturating at the representable range.
    pub fn synthetic(value: Decimal, spread: Decimal, endpoint: impl Into<String>) -> Self {
        let half = value.saturating_mul(spread);
        Self {
            bid: quantize(value.saturating_sub(half)),
            ask: quantize(value.saturating_add(half)),
            synthetic: true,
            endpoint: endpoint.into(),
        }
    }
}
