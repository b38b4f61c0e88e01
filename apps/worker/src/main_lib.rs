use std::sync::Arc;

use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use quotedesk_core::rates::RateService;
use quotedesk_core::storage::RedisStore;
use quotedesk_market_data::{
    Method, ProviderRegistry, QuoteRequest, ReqwestTransport, RetryPolicy, Source,
};

use crate::config::Config;

pub fn init_tracing() {
    let log_format = std::env::var("QD_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_service(config: &Config) -> anyhow::Result<Arc<RateService>> {
    let store = RedisStore::connect(&config.redis_url).await?;
    tracing::info!("Rate cache store: {}", config.redis_url);

    let transport = ReqwestTransport::with_timeout(config.request_timeout);
    let registry = ProviderRegistry::standard(
        Arc::new(transport),
        config.endpoints.clone(),
        RetryPolicy::default(),
    );

    Ok(Arc::new(RateService::new(
        Arc::new(store),
        Arc::new(registry),
        config.rates.clone(),
    )))
}

/// Requests kept warm, by name.
pub fn warm_requests(vwap_depth: u32) -> Vec<(String, QuoteRequest)> {
    vec![
        (
            "bybit".to_string(),
            QuoteRequest::new(Source::Bybit, Method::Vwap).with_depth(vwap_depth),
        ),
        (
            "rapira".to_string(),
            QuoteRequest::new(Source::Rapira, Method::Mid),
        ),
        (
            "grinex".to_string(),
            QuoteRequest::new(Source::Grinex, Method::Mid),
        ),
    ]
}
