use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter for the `folly` server: request spans from tower_http.
pub const SIMULATOR_FILTER: &str = "info,folly=info,tower_http=info,hyper=warn";
/// Default filter for the `runner`: client internals stay quiet.
pub const DRIVER_FILTER: &str = "info,folly=info,reqwest=warn,hyper=warn,hyper_util=warn";

/// JSON logs, one flat object per event, tagged with the binary name.
/// `RUST_LOG` overrides `default_filter`.
pub fn init_tracing(binary: &'static str, default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .with_current_span(false),
        )
        .init();
    info!(binary, version = env!("CARGO_PKG_VERSION"), "logging initialised");
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let received = tokio::select! {
        _ = ctrl_c => "interrupt",
        _ = terminate => "terminate",
    };
    info!(signal = received, "shutdown signal received");
}
