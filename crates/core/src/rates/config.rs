//! Rate cache configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use quotedesk_market_data::Source;

/// Default age after which a cached quote is shown as stale.
pub const DEFAULT_WARN_AGE_SECS: u64 = 30;

/// Cache lifetime per source, in seconds.
///
/// Missing fields fall back to their defaults, so a partial JSON object such
/// as `{"bybit": 10}` is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheTtlConfig {
    pub bybit: u64,
    pub rapira: u64,
    pub grinex: u64,
}

impl Default for CacheTtlConfig {
    fn default() -> Self {
        Self {
            bybit: 15,
            rapira: 30,
            grinex: 30,
        }
    }
}

impl CacheTtlConfig {
    pub fn secs_for(&self, source: Source) -> u64 {
        match source {
            Source::Bybit => self.bybit,
            Source::Rapira => self.rapira,
            Source::Grinex => self.grinex,
        }
    }
}

/// Immutable configuration of the rate cache service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatesConfig {
    pub cache_ttl_per_source: CacheTtlConfig,
    pub rate_warn_age_sec: u64,
}

impl Default for RatesConfig {
    fn default() -> Self {
        Self {
            cache_ttl_per_source: CacheTtlConfig::default(),
            rate_warn_age_sec: DEFAULT_WARN_AGE_SECS,
        }
    }
}

impl RatesConfig {
    /// Hard eviction window for entries of `source`.
    pub fn ttl_for(&self, source: Source) -> Duration {
        Duration::from_secs(self.cache_ttl_per_source.secs_for(source))
    }

    /// Age beyond which a quote is flagged stale.
    pub fn warn_age(&self) -> Duration {
        Duration::from_secs(self.rate_warn_age_sec)
    }
}
