//! Bybit v5 market API response models.
//!
//! Both `/v5/market/orderbook` (`result.b` / `result.a`) and
//! `/v5/market/tickers` (`result.list`) share the same envelope.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{coerce_decimal, ExtraKey};
use crate::provider::orderbook::{self, Level};
use crate::provider::shapes::{self, TickerFields};

const SPOT_TICKER: TickerFields = TickerFields {
    bid: &["bid1Price"],
    ask: &["ask1Price"],
    last: &["lastPrice"],
};

/// v5 response envelope
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V5Response {
    #[serde(default)]
    pub ret_code: Option<i64>,
    #[serde(default)]
    pub ret_msg: Option<String>,
    pub result: V5Result,
}

/// `result` object. Orderbook responses fill `b`/`a`, ticker responses
/// fill `list`.
#[derive(Debug, Default, Deserialize)]
pub struct V5Result {
    #[serde(default)]
    pub b: Option<Value>,
    #[serde(default)]
    pub a: Option<Value>,
    #[serde(default)]
    pub list: Option<Vec<Value>>,
}

impl V5Response {
    /// Decode the envelope. A non-zero `retCode` is a data error.
    pub fn parse(data: &Value) -> Result<Self, MarketDataError> {
        let response = Self::deserialize(data)
            .map_err(|e| MarketDataError::shape(format!("not a Bybit v5 response: {}", e)))?;

        match response.ret_code {
            Some(code) if code != 0 => Err(MarketDataError::InvalidData(format!(
                "Bybit retCode {}: {}",
                code,
                response.ret_msg.as_deref().unwrap_or("")
            ))),
            _ => Ok(response),
        }
    }

    /// Bid and ask levels, if this is an orderbook response.
    pub fn book(&self) -> Result<Option<(Vec<Level>, Vec<Level>)>, MarketDataError> {
        if self.result.b.is_none() && self.result.a.is_none() {
            return Ok(None);
        }
        let empty = Value::Array(Vec::new());
        let bids = orderbook::parse_levels(self.result.b.as_ref().unwrap_or(&empty))?;
        let asks = orderbook::parse_levels(self.result.a.as_ref().unwrap_or(&empty))?;
        Ok(Some((bids, asks)))
    }

    fn first_ticker(&self) -> Result<&Value, MarketDataError> {
        self.result
            .list
            .as_ref()
            .and_then(|list| list.first())
            .ok_or_else(|| MarketDataError::shape("Bybit response has no ticker entries"))
    }

    /// Mid of `bid1Price`/`ask1Price`, else `lastPrice`.
    pub fn ticker_value(&self) -> Result<Decimal, MarketDataError> {
        shapes::ticker_value(self.first_ticker()?, &SPOT_TICKER).map(|(value, _)| value)
    }

    pub fn ticker_bid_ask(&self) -> Result<(Decimal, Decimal), MarketDataError> {
        let (_, extras) = shapes::ticker_value(self.first_ticker()?, &SPOT_TICKER)?;
        match (extras.decimal(ExtraKey::Bid), extras.decimal(ExtraKey::Ask)) {
            (Some(bid), Some(ask)) => Ok((bid, ask)),
            _ => Err(MarketDataError::shape("Bybit ticker missing bid1Price/ask1Price")),
        }
    }

    /// `lastPrice` of the first ticker entry.
    pub fn last_price(&self) -> Result<Decimal, MarketDataError> {
        let item = self.first_ticker()?;
        match shapes::present(item, "lastPrice") {
            Some(last) => coerce_decimal(last),
            None => Err(MarketDataError::shape("Bybit ticker missing lastPrice")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_orderbook_response() {
        let data = json!({
            "retCode": 0,
            "retMsg": "OK",
            "result": {"s": "USDTRUB", "b": [["81.1", "10"]], "a": [["81.3", "2"]], "ts": 1}
        });
        let response = V5Response::parse(&data).unwrap();
        let (bids, asks) = response.book().unwrap().unwrap();
        assert_eq!(bids, vec![(dec!(81.1), dec!(10))]);
        assert_eq!(asks, vec![(dec!(81.3), dec!(2))]);
    }

    #[test]
    fn test_ticker_response() {
        let data = json!({"result": {"list": [{"lastPrice": "80.9", "bid1Price": ""}]}});
        let response = V5Response::parse(&data).unwrap();
        assert!(response.book().unwrap().is_none());
        assert_eq!(response.ticker_value().unwrap(), dec!(80.9));
        assert_eq!(response.last_price().unwrap(), dec!(80.9));
        assert!(response.ticker_bid_ask().is_err());
    }

    #[test]
    fn test_error_envelope() {
        let data = json!({"retCode": 10001, "retMsg": "params error", "result": {}});
        assert!(matches!(
            V5Response::parse(&data),
            Err(MarketDataError::InvalidData(_))
        ));
        assert!(matches!(
            V5Response::parse(&json!({"rates": {}})),
            Err(MarketDataError::UnsupportedShape(_))
        ));
    }
}
