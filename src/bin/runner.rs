use anyhow::Result;
use folly::config::DriverConfig;
use folly::driver::run_load_test;
use folly::telemetry::{init_tracing, DRIVER_FILTER};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("runner", DRIVER_FILTER);
    info!("running your load");

    let cfg = match DriverConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "error loading configuration");
            return Err(e.into());
        }
    };

    let results = run_load_test(&cfg).await?;
    let failures: usize = results.iter().map(|r| r.failures).sum();
    if failures > 0 {
        info!(failures, "some requests failed");
    }
    Ok(())
}
