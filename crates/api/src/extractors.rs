//! Request extractors.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path, Query},
    http::request::Parts,
};
use chrono::{DateTime, Utc};
use clicker_core::{BannerId, Error, ValidationErrorCode};
use serde::Deserialize;

use crate::response::ApiError;

/// Banner id from the `:banner_id` path segment.
#[derive(Debug, Clone, Copy)]
pub struct BannerIdPath(pub BannerId);

#[async_trait]
impl<S> FromRequestParts<S> for BannerIdPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::validation(ValidationErrorCode::InvalidBannerId, e.body_text()))?;

        let banner_id: BannerId = raw.parse()?;
        Ok(BannerIdPath(banner_id))
    }
}

#[derive(Debug, Deserialize)]
struct StatsQuery {
    #[serde(rename = "tsFrom")]
    ts_from: Option<String>,
    #[serde(rename = "tsTo")]
    ts_to: Option<String>,
}

/// Inclusive time range from `?tsFrom=...&tsTo=...` (RFC 3339).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsRange {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl StatsRange {
    pub fn parse(from: Option<&str>, to: Option<&str>) -> Result<Self, Error> {
        let from = parse_timestamp("tsFrom", from)?;
        let to = parse_timestamp("tsTo", to)?;

        if from > to {
            return Err(Error::validation_code(
                ValidationErrorCode::InvalidRange,
                format!("tsFrom {} is after tsTo {}", from.to_rfc3339(), to.to_rfc3339()),
            ));
        }

        Ok(Self { from, to })
    }
}

fn parse_timestamp(name: &str, value: Option<&str>) -> Result<DateTime<Utc>, Error> {
    let value = value.map(str::trim).filter(|v| !v.is_empty()).ok_or_else(|| {
        Error::validation_code(
            ValidationErrorCode::InvalidTimestamp,
            format!("{} is required", name),
        )
    })?;

    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| {
            Error::validation_code(
                ValidationErrorCode::InvalidTimestamp,
                format!("{} is not an RFC 3339 timestamp: {}", name, e),
            )
        })
}

#[async_trait]
impl<S> FromRequestParts<S> for StatsRange
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<StatsQuery>::try_from_uri(&parts.uri).map_err(|e| {
            ApiError::validation(ValidationErrorCode::InvalidTimestamp, e.body_text())
        })?;

        Ok(StatsRange::parse(query.ts_from.as_deref(), query.ts_to.as_deref())?)
    }
}
