use std::fmt;

use serde::{Deserialize, Serialize};

/// Upstream feed family a rate is requested from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Bybit,
    Rapira,
    Grinex,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Bybit, Source::Rapira, Source::Grinex];

    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Bybit => "bybit",
            Source::Rapira => "rapira",
            Source::Grinex => "grinex",
        }
    }
}

/// Aggregation used to turn an upstream book or ticker into one value.
///
/// `Median` and `TrimmedMean` are part of the vocabulary but have no
/// extraction logic; requests using them are rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Mid,
    Best,
    Vwap,
    Median,
    TrimmedMean,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Mid => "mid",
            Method::Best => "best",
            Method::Vwap => "vwap",
            Method::Median => "median",
            Method::TrimmedMean => "trimmed_mean",
        }
    }

    /// Whether any provider can extract a value for this method.
    pub fn is_supported(&self) -> bool {
        matches!(self, Method::Mid | Method::Best | Method::Vwap)
    }
}

/// Endpoint strategy within the Bybit family.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Orderbook,
    P2p,
    Composed,
}

impl Mode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Orderbook => "orderbook",
            Mode::P2p => "p2p",
            Mode::Composed => "composed",
        }
    }
}

/// Regional adjustment tag. Carried through for cache partitioning and
/// presentation; never computed here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Geo {
    #[default]
    None,
    Rio,
    Berlin,
}

impl Geo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Geo::None => "none",
            Geo::Rio => "rio",
            Geo::Berlin => "berlin",
        }
    }
}

macro_rules! display_as_str {
    ($($ty:ty),*) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )*
    };
}

display_as_str!(Source, Method, Mode, Geo);
