//! Read endpoints: stats and banners.

use axum::{extract::State, Json};
use clicker_core::{Banner, ClickStat};
use tracing::debug;

use crate::extractors::{BannerIdPath, StatsRange};
use crate::response::ApiError;
use crate::state::AppState;

/// Banners returned by `/banners/random`.
pub const RANDOM_BANNERS_LIMIT: u32 = 20;

/// GET /stats/:banner_id?tsFrom=..&tsTo=.. - Per-minute counts, oldest first.
pub async fn stats_handler(
    State(state): State<AppState>,
    BannerIdPath(banner_id): BannerIdPath,
    range: StatsRange,
) -> Result<Json<Vec<ClickStat>>, ApiError> {
    let stats = state.stats.get_stats(banner_id, range.from, range.to).await?;

    debug!(
        banner_id = %banner_id,
        from = %range.from,
        to = %range.to,
        rows = stats.len(),
        "Served stats"
    );
    Ok(Json(stats))
}

/// GET /banners/random - A sample of existing banners.
pub async fn random_banners_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<Banner>>, ApiError> {
    let banners = state.stats.random_banners(RANDOM_BANNERS_LIMIT).await?;
    Ok(Json(banners))
}
