use axum::{http::StatusCode, response::IntoResponse};

/// GET /health/live - Liveness probe
///
/// Returns 200 if the server is accepting requests
pub async fn liveness_check() -> impl IntoResponse {
    StatusCode::OK
}
