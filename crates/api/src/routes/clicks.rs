//! Click registration endpoint.

use axum::{extract::State, Json};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::extractors::BannerIdPath;
use crate::response::{ApiError, ClickResponse};
use crate::state::AppState;

/// POST /counter/:banner_id - Count one click.
///
/// Returns once the click is in the intake queue, not once it is stored.
pub async fn click_handler(
    State(state): State<AppState>,
    BannerIdPath(banner_id): BannerIdPath,
) -> Result<Json<ClickResponse>, ApiError> {
    // Pipeline shutdown is handled inside the service
    state
        .clicks
        .register_click(banner_id, &CancellationToken::new())
        .await?;

    debug!(banner_id = %banner_id, "Click registered");
    Ok(Json(ClickResponse::ok()))
}
