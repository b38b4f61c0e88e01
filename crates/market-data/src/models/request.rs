use serde::{Deserialize, Serialize};

use super::types::{Geo, Method, Mode, Source};
use crate::errors::MarketDataError;

/// Orderbook depth used when a request doesn't specify one.
pub const DEFAULT_DEPTH: u32 = 5;

/// A request for one rate.
///
/// Every field takes part in the cache key: two requests differing in any
/// field are distinct cached entities.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuoteRequest {
    pub source: Source,
    pub method: Method,
    #[serde(default)]
    pub geo: Geo,
    #[serde(default)]
    pub mode: Mode,
    #[serde(default)]
    pub depth: Option<u32>,
}

impl QuoteRequest {
    /// Create a request with default geo, mode and depth.
    pub fn new(source: Source, method: Method) -> Self {
        Self {
            source,
            method,
            geo: Geo::default(),
            mode: Mode::default(),
            depth: None,
        }
    }

    pub fn with_geo(mut self, geo: Geo) -> Self {
        self.geo = geo;
        self
    }

    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Number of orderbook levels to aggregate: the requested depth or
    /// [`DEFAULT_DEPTH`], never less than one.
    pub fn effective_depth(&self) -> usize {
        self.depth.unwrap_or(DEFAULT_DEPTH).max(1) as usize
    }

    /// Reject methods no provider can extract.
    pub fn ensure_supported(&self) -> Result<(), MarketDataError> {
        if self.method.is_supported() {
            Ok(())
        } else {
            Err(MarketDataError::UnsupportedMethod(self.method))
        }
    }
}
