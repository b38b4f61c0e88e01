//! Orderbook aggregation: level parsing, VWAP and mid.

use rust_decimal::Decimal;
use serde_json::Value;

use crate::errors::MarketDataError;
use crate::models::{coerce_decimal, Method};

/// One book level: (price, quantity).
pub type Level = (Decimal, Decimal);

/// Parse a side of a book.
///
/// Accepts `[[price, qty], ...]` (strings or numbers, extra columns ignored)
/// and `[{"price": .., "amount"|"qty"|"quantity"|"volume": ..}, ...]`.
pub fn parse_levels(side: &Value) -> Result<Vec<Level>, MarketDataError> {
    let Some(rows) = side.as_array() else {
        return Err(MarketDataError::shape("orderbook side is not a list"));
    };

    rows.iter()
        .map(|row| match row {
            Value::Array(cells) if cells.len() >= 2 => {
                Ok((coerce_decimal(&cells[0])?, coerce_decimal(&cells[1])?))
            }
            Value::Object(map) => {
                let price = map
                    .get("price")
                    .ok_or_else(|| MarketDataError::shape("level without price"))?;
                let qty = ["amount", "qty", "quantity", "volume"]
                    .iter()
                    .find_map(|key| map.get(*key))
                    .ok_or_else(|| MarketDataError::shape("level without quantity"))?;
                Ok((coerce_decimal(price)?, coerce_decimal(qty)?))
            }
            _ => Err(MarketDataError::shape("unrecognized orderbook level")),
        })
        .collect()
}

/// VWAP of the first `depth` levels (at least one) of one side.
pub fn side_vwap(levels: &[Level], depth: usize) -> Result<Decimal, MarketDataError> {
    if levels.is_empty() {
        return Err(MarketDataError::EmptyOrderbook);
    }

    let taken = &levels[..depth.max(1).min(levels.len())];
    let (notional, quantity) = taken.iter().try_fold(
        (Decimal::ZERO, Decimal::ZERO),
        |(n, q), (price, qty)| {
            let n = price.checked_mul(*qty).and_then(|pq| n.checked_add(pq));
            let q = q.checked_add(*qty);
            n.zip(q).ok_or_else(|| MarketDataError::overflow("orderbook notional"))
        },
    )?;

    if quantity.is_zero() {
        return Err(MarketDataError::ZeroQuantity);
    }
    notional
        .checked_div(quantity)
        .ok_or_else(|| MarketDataError::overflow("orderbook vwap"))
}

/// Average of the bid-side and ask-side VWAPs.
pub fn vwap(bids: &[Level], asks: &[Level], depth: usize) -> Result<Decimal, MarketDataError> {
    let bid = side_vwap(bids, depth)?;
    let ask = side_vwap(asks, depth)?;
    mean(bid, ask)
}

/// Best bid and best ask.
pub fn top_of_book(bids: &[Level], asks: &[Level]) -> Result<(Decimal, Decimal), MarketDataError> {
    match (bids.first(), asks.first()) {
        (Some((bid, _)), Some((ask, _))) => Ok((*bid, *ask)),
        _ => Err(MarketDataError::EmptyOrderbook),
    }
}

/// Mean of best bid and best ask.
pub fn mid(bids: &[Level], asks: &[Level]) -> Result<Decimal, MarketDataError> {
    let (bid, ask) = top_of_book(bids, asks)?;
    mean(bid, ask)
}

/// Mean of two prices, failing instead of overflowing.
pub fn mean(a: Decimal, b: Decimal) -> Result<Decimal, MarketDataError> {
    a.checked_add(b)
        .and_then(|sum| sum.checked_div(Decimal::TWO))
        .ok_or_else(|| MarketDataError::overflow("price mean"))
}

/// Aggregate a book according to `method`. `Best` reads top-of-book, which
/// is reported as the mid.
pub fn aggregate(
    method: Method,
    bids: &[Level],
    asks: &[Level],
    depth: usize,
) -> Result<Decimal, MarketDataError> {
    match method {
        Method::Vwap => vwap(bids, asks, depth),
        Method::Mid | Method::Best => mid(bids, asks),
        Method::Median | Method::TrimmedMean => Err(MarketDataError::UnsupportedMethod(method)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn asks() -> Vec<Level> {
        vec![(dec!(100), dec!(2)), (dec!(101), dec!(3))]
    }

    fn bids() -> Vec<Level> {
        vec![(dec!(99), dec!(1)), (dec!(98), dec!(4))]
    }

    #[test]
    fn test_vwap_worked_example() {
        assert_eq!(side_vwap(&bids(), 2).unwrap(), dec!(98.2));
        assert_eq!(side_vwap(&asks(), 2).unwrap(), dec!(100.6));
        assert_eq!(vwap(&bids(), &asks(), 2).unwrap(), dec!(99.4));
    }

    #[test]
    fn test_vwap_respects_depth() {
        assert_eq!(side_vwap(&bids(), 1).unwrap(), dec!(99));
        // depth zero is treated as one level
        assert_eq!(side_vwap(&asks(), 0).unwrap(), dec!(100));
        // depth beyond the book uses every level
        assert_eq!(side_vwap(&asks(), 50).unwrap(), dec!(100.6));
    }

    #[test]
    fn test_vwap_undefined_cases() {
        assert!(matches!(
            vwap(&[], &asks(), 5),
            Err(MarketDataError::EmptyOrderbook)
        ));
        let zero = vec![(dec!(99), dec!(0)), (dec!(98), dec!(0))];
        assert!(matches!(
            vwap(&zero, &asks(), 5),
            Err(MarketDataError::ZeroQuantity)
        ));
    }

    #[test]
    fn test_mid() {
        assert_eq!(mid(&bids(), &asks()).unwrap(), dec!(99.5));
        assert!(matches!(
            mid(&bids(), &[]),
            Err(MarketDataError::EmptyOrderbook)
        ));
    }

    #[test]
    fn test_aggregate_dispatch() {
        assert_eq!(aggregate(Method::Vwap, &bids(), &asks(), 2).unwrap(), dec!(99.4));
        assert_eq!(aggregate(Method::Best, &bids(), &asks(), 2).unwrap(), dec!(99.5));
        assert!(matches!(
            aggregate(Method::Median, &bids(), &asks(), 2),
            Err(MarketDataError::UnsupportedMethod(Method::Median))
        ));
    }

    #[test]
    fn test_parse_levels_shapes() {
        let levels = parse_levels(&json!([["100.5", "2"], [101, 3.5]])).unwrap();
        assert_eq!(levels, vec![(dec!(100.5), dec!(2)), (dec!(101), dec!(3.5))]);

        let levels = parse_levels(&json!([{"price": "99", "amount": "1.25"}])).unwrap();
        assert_eq!(levels, vec![(dec!(99), dec!(1.25))]);

        assert!(parse_levels(&json!("nope")).is_err());
        assert!(parse_levels(&json!([["abc", "1"]])).is_err());
    }

    #[test]
    fn test_overflow_is_invalid_data() {
        let huge = vec![(Decimal::MAX, dec!(2))];
        assert!(matches!(
            side_vwap(&huge, 5),
            Err(MarketDataError::InvalidData(_))
        ));
        assert!(matches!(
            mid(&[(Decimal::MAX, dec!(1))], &[(Decimal::MAX, dec!(1))]),
            Err(MarketDataError::InvalidData(_))
        ));
        assert_eq!(mean(dec!(81.5), dec!(81.7)).unwrap(), dec!(81.6));
    }
}
