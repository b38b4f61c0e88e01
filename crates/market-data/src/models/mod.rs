//! Rate data models
//!
//! This module contains the core data types for rate operations:
//! - `types` - Closed enumerations (Source, Method, Mode, Geo)
//! - `request` - The request shape that keys a cached rate (QuoteRequest)
//! - `quote` - Normalized quote, provider output and two-sided quote
//! - `extras` - Closed provenance side-channel carried on every quote

mod extras;
mod quote;
mod request;
mod types;

pub use extras::{ExtraKey, ExtraValue, Extras};
pub use quote::{
    coerce_decimal, parse_decimal, quantize, BidAsk, CachedRate, Quote, VALUE_SCALE,
};
pub use request::{QuoteRequest, DEFAULT_DEPTH};
pub use types::{Geo, Method, Mode, Source};
