//! Recognizers for response shapes shared by several providers.

use rust_decimal::Decimal;
use serde_json::Value;

use super::orderbook::{self, Level};
use crate::errors::MarketDataError;
use crate::models::{coerce_decimal, ExtraKey, Extras, Method};

/// Fiat currency every feed is normalized to.
pub const TARGET_CURRENCY: &str = "RUB";

/// Canonical form of the traded pair, see [`is_target_pair`].
const TARGET_PAIR: &str = "USDTRUB";

/// Whether an upstream instrument name denotes USDT/RUB, whatever the
/// separator or case (`USDT/RUB`, `usdt_rub`, `usdtrub`, ...).
pub fn is_target_pair(name: &str) -> bool {
    let normalized: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '_' | '-' | ' ' | ':'))
        .collect::<String>()
        .to_ascii_uppercase();
    normalized == TARGET_PAIR
}

/// A JSON field that is present and carries a value (`null` and `""` count
/// as absent).
pub fn present<'a>(item: &'a Value, key: &str) -> Option<&'a Value> {
    match item.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(text)) if text.trim().is_empty() => None,
        Some(value) => Some(value),
    }
}

fn first_present<'a>(item: &'a Value, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|key| present(item, key))
}

/// `{"rates": {"RUB": x}}`
pub fn flattened_rate(data: &Value) -> Option<Result<Decimal, MarketDataError>> {
    data.get("rates")
        .and_then(|rates| present(rates, TARGET_CURRENCY))
        .map(coerce_decimal)
}

/// `{"price": x}` with a scalar `x`.
pub fn single_price(data: &Value) -> Option<Result<Decimal, MarketDataError>> {
    match data.get("price") {
        Some(price @ (Value::Number(_) | Value::String(_))) => Some(coerce_decimal(price)),
        _ => None,
    }
}

/// `{"orderbook": {"bids": [...], "asks": [...]}}`
pub fn generic_orderbook(
    data: &Value,
) -> Option<Result<(Vec<Level>, Vec<Level>), MarketDataError>> {
    let book = data.get("orderbook").filter(|book| book.is_object())?;
    let empty = Value::Array(Vec::new());
    let side = |key: &str| {
        let raw = book.get(key).filter(|v| !v.is_null()).unwrap_or(&empty);
        orderbook::parse_levels(raw)
    };
    Some(side("bids").and_then(|bids| Ok((bids, side("asks")?))))
}

/// Flattened rate, then single price. Used by every provider once its
/// native shape didn't match.
pub fn flat_or_price(data: &Value) -> Result<(Decimal, &'static str), MarketDataError> {
    if let Some(rate) = flattened_rate(data) {
        return Ok((rate?, "rates"));
    }
    if let Some(price) = single_price(data) {
        return Ok((price?, "price"));
    }
    Err(MarketDataError::shape("no rates or price field"))
}

/// Flattened rate, single price, then a generic orderbook aggregated per
/// `method`.
pub fn generic_document(
    data: &Value,
    method: Method,
    depth: usize,
) -> Result<(Decimal, &'static str), MarketDataError> {
    match flat_or_price(data) {
        Ok(found) => Ok(found),
        Err(_) => match generic_orderbook(data) {
            Some(book) => {
                let (bids, asks) = book?;
                Ok((orderbook::aggregate(method, &bids, &asks, depth)?, "orderbook"))
            }
            None => Err(MarketDataError::shape(
                "unsupported response format for endpoint",
            )),
        },
    }
}

/// Field names a feed uses for one ticker entry.
pub struct TickerFields {
    pub bid: &'static [&'static str],
    pub ask: &'static [&'static str],
    pub last: &'static [&'static str],
}

/// Value of a two-sided ticker entry: mean of ask and bid when both are
/// present, else the last/close price. The reported sides are returned as
/// extras.
pub fn ticker_value(
    item: &Value,
    fields: &TickerFields,
) -> Result<(Decimal, Extras), MarketDataError> {
    let bid = first_present(item, fields.bid).map(coerce_decimal).transpose()?;
    let ask = first_present(item, fields.ask).map(coerce_decimal).transpose()?;

    let mut extras = Extras::new();
    if let Some(ask) = ask {
        extras.insert(ExtraKey::Ask, ask);
    }
    if let Some(bid) = bid {
        extras.insert(ExtraKey::Bid, bid);
    }

    if let (Some(bid), Some(ask)) = (bid, ask) {
        return Ok((orderbook::mean(ask, bid)?, extras));
    }
    match first_present(item, fields.last) {
        Some(last) => Ok((coerce_decimal(last)?, extras)),
        None => Err(MarketDataError::shape("ticker missing ask/bid/last")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    const FIELDS: TickerFields = TickerFields {
        bid: &["bidPrice"],
        ask: &["askPrice"],
        last: &["close"],
    };

    #[test]
    fn test_is_target_pair() {
        for name in ["USDT/RUB", "usdtrub", "USDT_RUB", "usdt-rub"] {
            assert!(is_target_pair(name), "{name}");
        }
        assert!(!is_target_pair("BTC/RUB"));
        assert!(!is_target_pair("RUB/USDT"));
    }

    #[test]
    fn test_flat_or_price() {
        let (value, note) = flat_or_price(&json!({"rates": {"RUB": 91.2}})).unwrap();
        assert_eq!((value, note), (dec!(91.2), "rates"));

        let (value, note) = flat_or_price(&json!({"price": "90.1"})).unwrap();
        assert_eq!((value, note), (dec!(90.1), "price"));

        assert!(flat_or_price(&json!({"price": {"nested": 1}})).is_err());
        assert!(flat_or_price(&json!({"rates": {"RUB": "n/a"}})).is_err());
    }

    #[test]
    fn test_generic_document_orderbook() {
        let data = json!({
            "orderbook": {
                "bids": [["99", "1"], ["98", "4"]],
                "asks": [["100", "2"], ["101", "3"]]
            }
        });
        let (value, note) = generic_document(&data, Method::Vwap, 2).unwrap();
        assert_eq!((value, note), (dec!(99.4), "orderbook"));

        let (value, _) = generic_document(&data, Method::Mid, 2).unwrap();
        assert_eq!(value, dec!(99.5));

        let empty = json!({"orderbook": {"bids": [], "asks": [["100", "1"]]}});
        assert!(matches!(
            generic_document(&empty, Method::Mid, 5),
            Err(MarketDataError::EmptyOrderbook)
        ));

        assert!(matches!(
            generic_document(&json!({"status": "ok"}), Method::Mid, 5),
            Err(MarketDataError::UnsupportedShape(_))
        ));
    }

    #[test]
    fn test_ticker_value_prefers_both_sides() {
        let item = json!({"askPrice": 82.43, "bidPrice": "82.42", "close": 80});
        let (value, extras) = ticker_value(&item, &FIELDS).unwrap();
        assert_eq!(value, dec!(82.425));
        assert_eq!(extras.decimal(ExtraKey::Ask), Some(dec!(82.43)));
        assert_eq!(extras.decimal(ExtraKey::Bid), Some(dec!(82.42)));
    }

    #[test]
    fn test_ticker_value_falls_back_to_last() {
        let item = json!({"askPrice": "", "bidPrice": 82.42, "close": 80.5});
        let (value, _) = ticker_value(&item, &FIELDS).unwrap();
        assert_eq!(value, dec!(80.5));

        assert!(ticker_value(&json!({"symbol": "USDT/RUB"}), &FIELDS).is_err());
    }
}
