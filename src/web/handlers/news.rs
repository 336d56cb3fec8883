//! News handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::header::CACHE_CONTROL,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info};

use crate::news::{Snapshot, TranslatedNewsItem};
use crate::web::dto::RefreshResponse;
use crate::web::error::ApiError;
use crate::web::middleware::RefreshAuth;

use super::AppState;

/// GET /api/news
///
/// Serves the translated feed, recomputing it when the cached result has
/// expired. Upstream failures fall back to the last result, or to an empty
/// list when nothing was ever fetched.
pub async fn get_news(State(state): State<Arc<AppState>>) -> Response {
    let snapshot = state.aggregator.news().await;
    let items: &[TranslatedNewsItem] = snapshot.as_deref().map(Snapshot::items).unwrap_or_default();

    (
        [(CACHE_CONTROL, state.cache_control.clone())],
        Json(items),
    )
        .into_response()
}

/// GET|POST /api/news/refresh
///
/// Forces a full aggregation pass. Requires `Authorization: Bearer <secret>`.
pub async fn refresh_news(
    State(state): State<Arc<AppState>>,
    _auth: RefreshAuth,
) -> Result<Json<RefreshResponse>, ApiError> {
    if !state.refresh_limiter.check() {
        return Err(ApiError::too_many_requests(
            "Refresh rate limit exceeded. Please try again later.",
        ));
    }

    info!("Forced refresh requested");

    // Detached from the request: a dropped client must not cancel the pass.
    let aggregator = Arc::clone(&state.aggregator);
    let outcome = tokio::spawn(async move { aggregator.refresh().await })
        .await
        .map_err(|e| {
            error!("Refresh task failed: {}", e);
            ApiError::internal(format!("refresh failed: {}", e))
        })?;

    info!(
        outcome = outcome.label(),
        items = outcome.items().len(),
        "Forced refresh finished"
    );

    Ok(Json(RefreshResponse::from_outcome(&outcome)))
}

/// Fallback for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    ApiError::not_found("Not found")
}
