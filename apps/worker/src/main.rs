mod config;
mod main_lib;
mod scheduler;

use config::Config;
use main_lib::{build_service, init_tracing, warm_requests};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();
    let service = build_service(&config).await?;

    let handle = scheduler::start_warm_up_scheduler(
        service,
        warm_requests(config.vwap_depth),
        config.warm_up_interval,
    );

    tokio::select! {
        result = handle => {
            result?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            tracing::info!("Shutting down");
        }
    }
    Ok(())
}
