//! Background scheduler for periodic rate warm-up.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::{debug, info};

use quotedesk_core::rates::{RateService, RateServiceTrait};
use quotedesk_market_data::QuoteRequest;

/// Starts the warm-up loop. The first tick is immediate.
pub fn start_warm_up_scheduler(
    service: Arc<RateService>,
    requests: Vec<(String, QuoteRequest)>,
    every: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(
            "Rate warm-up scheduler started ({} rates every {:?})",
            requests.len(),
            every
        );

        let mut warm_interval = interval(every);
        warm_interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            warm_interval.tick().await;
            run_warm_up(&service, &requests).await;
        }
    })
}

/// Runs a single warm-up pass.
async fn run_warm_up(service: &RateService, requests: &[(String, QuoteRequest)]) {
    debug!("Running scheduled rate warm-up...");
    let refreshed = service.warm_up(requests).await;
    if refreshed < requests.len() {
        debug!(
            "{} of {} rates not refreshed this pass",
            requests.len() - refreshed,
            requests.len()
        );
    }
}
