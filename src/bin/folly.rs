use anyhow::Result;
use folly::aggregator::{completion_queue, Aggregator, COMPLETION_QUEUE_CAPACITY};
use folly::api::{self, AppState};
use folly::config::SimulatorConfig;
use folly::memory::TrackingAllocator;
use folly::profile::{CpuProfile, PROFILE_PATH};
use folly::telemetry::{init_tracing, shutdown_signal, SIMULATOR_FILTER};
use folly::work::{self, WorkSimulator};
use std::sync::Arc;
use tracing::{error, info, warn};

#[global_allocator]
static GLOBAL: TrackingAllocator = TrackingAllocator;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing("folly", SIMULATOR_FILTER);
    info!("this is folly");

    let cfg = match SimulatorConfig::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!(error = %e, "error loading configuration");
            return Err(e.into());
        }
    };

    if std::env::args().nth(1).as_deref() == Some("once") {
        let outcome = work::invoke_once(cfg).await;
        info!(outcome, "single invocation finished");
        return Ok(());
    }

    let (tx, rx) = completion_queue(COMPLETION_QUEUE_CAPACITY);
    tokio::spawn(Aggregator::new().run(rx));

    let cfg = Arc::new(cfg);
    let mut simulator = WorkSimulator::new(cfg.clone(), tx);
    let profile = cfg.cpu_profile.then(|| Arc::new(CpuProfile::new()));
    if let Some(profile) = &profile {
        info!(path = PROFILE_PATH, "cpu profiling enabled");
        simulator = simulator.with_profile(profile.clone());
    }

    let app = api::router(AppState::new(simulator));
    let addr = cfg.socket_addr();
    info!(
        %addr,
        duration_min_ms = cfg.duration_min_ms,
        duration_max_ms = cfg.duration_max_ms,
        memory_bytes = cfg.memory_bytes,
        "starting folly"
    );

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!(error = %e, "error in http server");
    }

    if let Some(profile) = profile {
        if let Err(e) = profile.write_to(PROFILE_PATH) {
            warn!(error = %e, "failed to write cpu profile");
        }
    }

    info!("your folly is complete");
    Ok(())
}
