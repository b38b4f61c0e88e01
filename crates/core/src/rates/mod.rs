//! Rate cache module.
//!
//! - [`config`] - TTL and staleness configuration
//! - [`service`] - Rate cache service: key construction, cached reads,
//!   forced refresh, staleness projection and batched warm-up
//!
//! # Architecture
//!
//! ```text
//! RateService → ProviderRegistry → market-data crate (providers)
//!      ↓
//! KeyValueStore (Redis / memory)
//! ```

pub mod config;
pub mod service;


pub use config::{CacheTtlConfig, RatesConfig};
pub use service::{mark_stale, mark_stale_at, RateService, RateServiceTrait};
