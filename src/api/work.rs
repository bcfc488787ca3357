use axum::{extract::State, http::StatusCode, response::IntoResponse};

use super::AppState;

/// GET /work - Runs one work invocation before responding
pub async fn perform_work(State(state): State<AppState>) -> impl IntoResponse {
    state.simulator.perform_work().await;
    (StatusCode::OK, "ok")
}
