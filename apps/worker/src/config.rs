use anyhow::Context;
use std::time::Duration;

use quotedesk_core::rates::{CacheTtlConfig, RatesConfig};
use quotedesk_market_data::ProviderEndpoints;

pub struct Config {
    pub redis_url: String,
    pub endpoints: ProviderEndpoints,
    pub vwap_depth: u32,
    pub rates: RatesConfig,
    pub request_timeout: Duration,
    pub warm_up_interval: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any variable source; blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let secs = |key: &str, default: u64| -> anyhow::Result<u64> {
            match var(key) {
                Some(raw) => raw
                    .trim()
                    .parse()
                    .with_context(|| format!("Invalid {}: {:?}", key, raw)),
                None => Ok(default),
            }
        };

        let cache_ttl_per_source = match var("CACHE_TTL_SEC_PER_SOURCE") {
            Some(raw) => serde_json::from_str::<CacheTtlConfig>(&raw)
                .with_context(|| format!("Invalid CACHE_TTL_SEC_PER_SOURCE: {}", raw))?,
            None => CacheTtlConfig::default(),
        };

        Ok(Self {
            redis_url: var("REDIS_URL").unwrap_or_else(|| "redis://127.0.0.1:6379".into()),
            endpoints: ProviderEndpoints {
                bybit: var("BYBIT_ENDPOINT"),
                rapira: var("RAPIRA_ENDPOINT"),
                grinex: var("GRINEX_ENDPOINT"),
            },
            vwap_depth: match var("VWAP_DEPTH") {
                Some(raw) => raw
                    .trim()
                    .parse::<u32>()
                    .with_context(|| format!("Invalid VWAP_DEPTH: {:?}", raw))?,
                None => 5,
            },
            rates: RatesConfig {
                cache_ttl_per_source,
                rate_warn_age_sec: secs("RATE_WARN_AGE_SEC", 30)?,
            },
            request_timeout: Duration::from_secs(secs("REQUEST_TIMEOUT", 10)?),
            warm_up_interval: Duration::from_secs(secs("WARM_UP_INTERVAL_SEC", 10)?.max(1)),
        })
    }
}
