use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Recognized provenance keys.
///
/// The set is closed so that every stored quote decodes back into the same
/// shape; an unknown key in a stored entry is a decode error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtraKey {
    /// URL that actually produced the value.
    Endpoint,
    /// Extraction path taken (`cross-rate`, `orderbook`, `public-no-key`, ...).
    Note,
    /// Best ask reported by a native two-sided shape.
    Ask,
    /// Best bid reported by a native two-sided shape.
    Bid,
    /// Instrument name as reported upstream.
    Symbol,
    /// Set when the shared public rate chain served the quote.
    Fallback,
}

/// Scalar extras value. Decimals are kept as their canonical text so they
/// survive a JSON round-trip without float conversion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExtraValue {
    Flag(bool),
    Text(String),
}

impl From<bool> for ExtraValue {
    fn from(value: bool) -> Self {
        ExtraValue::Flag(value)
    }
}

impl From<&str> for ExtraValue {
    fn from(value: &str) -> Self {
        ExtraValue::Text(value.to_string())
    }
}

impl From<String> for ExtraValue {
    fn from(value: String) -> Self {
        ExtraValue::Text(value)
    }
}

impl From<Decimal> for ExtraValue {
    fn from(value: Decimal) -> Self {
        ExtraValue::Text(value.normalize().to_string())
    }
}

/// Provenance side-channel attached to every quote.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Extras(BTreeMap<ExtraKey, ExtraValue>);

impl Extras {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, key: ExtraKey, value: impl Into<ExtraValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: ExtraKey, value: impl Into<ExtraValue>) {
        self.0.insert(key, value.into());
    }

    pub fn get(&self, key: ExtraKey) -> Option<&ExtraValue> {
        self.0.get(&key)
    }

    pub fn text(&self, key: ExtraKey) -> Option<&str> {
        match self.0.get(&key) {
            Some(ExtraValue::Text(text)) => Some(text.as_str()),
            _ => None,
        }
    }

    pub fn flag(&self, key: ExtraKey) -> bool {
        matches!(self.0.get(&key), Some(ExtraValue::Flag(true)))
    }

    /// Parse a text extra as a decimal. Non-numeric text yields `None`.
    pub fn decimal(&self, key: ExtraKey) -> Option<Decimal> {
        self.text(key).and_then(|text| Decimal::from_str(text).ok())
    }

    /// Whether the public rate chain produced this quote.
    pub fn is_fallback(&self) -> bool {
        self.flag(ExtraKey::Fallback)
    }

    pub fn extend(&mut self, other: Extras) {
        self.0.extend(other.0);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ExtraKey, &ExtraValue)> {
        self.0.iter()
    }
}
