//! Health check endpoints.

use axum::{extract::State, http::StatusCode, Json};
use telemetry::health;

use crate::response::HealthResponse;
use crate::state::AppState;

/// GET /health - Full health check.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let report = health().report();
    let queue = state.clicks.queue();

    Json(HealthResponse {
        status: report.status.as_str().to_string(),
        clickhouse_connected: health().clickhouse.is_healthy(),
        aggregator_running: health().aggregator.is_healthy(),
        queue_depth: queue.depth(),
        queue_capacity: queue.capacity(),
        pending_banners: state.bucket.pending_banners(),
    })
}

/// GET /health/ready - Readiness probe (can accept traffic).
pub async fn ready_handler() -> StatusCode {
    if health().is_ready() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}

/// GET /health/live - Liveness probe (service is running).
pub async fn live_handler() -> StatusCode {
    if health().is_alive() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    }
}
