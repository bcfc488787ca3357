pub mod health;
pub mod work;

use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::work::WorkSimulator;

#[derive(Clone)]
pub struct AppState {
    pub simulator: WorkSimulator,
}

impl AppState {
    pub fn new(simulator: WorkSimulator) -> Self {
        Self { simulator }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/work", get(work::perform_work))
        .route("/health/live", get(health::liveness_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
