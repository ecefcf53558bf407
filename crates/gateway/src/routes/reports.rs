//! Staff-only reporting endpoints backed by the Google adapters.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use siteflow_core::metrics::{PageSpeedReport, SearchReport, TrafficReport};

use crate::error::{AppError, Result};
use crate::middleware::RequireStaff;
use crate::state::AppState;

/// `GET /api/analytics/traffic`
#[instrument(skip_all)]
pub async fn traffic(
    State(state): State<AppState>,
    RequireStaff(_): RequireStaff,
) -> Result<Json<TrafficReport>> {
    Ok(Json(state.traffic().traffic_report().await?))
}

/// `GET /api/search-console/summary`
#[instrument(skip_all)]
pub async fn search_summary(
    State(state): State<AppState>,
    RequireStaff(_): RequireStaff,
) -> Result<Json<SearchReport>> {
    Ok(Json(state.search().search_report().await?))
}

#[derive(Debug, Deserialize)]
pub struct PageSpeedQuery {
    pub url: Option<String>,
}

/// `GET /api/pagespeed?url=`
#[instrument(skip_all)]
pub async fn pagespeed(
    State(state): State<AppState>,
    RequireStaff(_): RequireStaff,
    Query(query): Query<PageSpeedQuery>,
) -> Result<Json<PageSpeedReport>> {
    let url = validate_target(query.url.as_deref())?;
    Ok(Json(state.pagespeed().report(url.as_str()).await?))
}

/// Accept only absolute http(s) URLs with a host.
///
/// # Errors
///
/// Returns `AppError::BadRequest` when the URL is missing or not http(s).
pub fn validate_target(raw: Option<&str>) -> Result<Url> {
    let raw = raw
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("url is required".to_string()))?;

    let url = Url::parse(raw)
        .map_err(|_| AppError::BadRequest("url must be an absolute http(s) URL".to_string()))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(AppError::BadRequest(
            "url must be an absolute http(s) URL".to_string(),
        ));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_target() {
        assert!(validate_target(Some("https://siteflow.dev/pricing")).is_ok());
        assert!(validate_target(Some(" http://localhost:3001 ")).is_ok());

        for bad in [None, Some(""), Some("siteflow.dev"), Some("ftp://siteflow.dev"), Some("javascript:alert(1)")] {
            assert!(
                matches!(validate_target(bad), Err(AppError::BadRequest(_))),
                "{bad:?}"
            );
        }
    }
}
