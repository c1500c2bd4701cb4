//! Internal maintenance endpoints.
//!
//! # Endpoints
//!
//! - `POST /internal/sweep` – run one auto-lock sweep pass now (sweep secret)

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header},
    routing::post,
};
use gridpool_core::processors::sweep_once;
use gridpool_sdk::objects::event::SweepResponse;

use crate::api::ApiError;
use crate::state::AppState;

/// Build the internal API router.
pub fn router() -> Router<AppState> {
    Router::new().route("/internal/sweep", post(trigger_sweep))
}

/// `POST /internal/sweep` — lock and randomize every overdue pool now.
///
/// Shares its code path with the scheduled sweeper, so an external cron
/// can drive the system instead of (or in addition to) the built-in
/// interval. Authenticated by `Authorization: Bearer {secret}` from the
/// `[sweep]` config section; while no secret is configured every request
/// is rejected.
async fn trigger_sweep(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<SweepResponse>, ApiError> {
    let expected = state.config.sweep.read().await.secret.clone();
    let provided = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    let authorized = match (&expected, provided) {
        (Some(expected), Some(provided)) => expected.as_str() == provided,
        _ => false,
    };
    if !authorized {
        return Err(ApiError::unauthorized("invalid sweep secret"));
    }

    let outcomes = sweep_once(&state.db, &state.audit_tx).await?;
    Ok(Json(SweepResponse {
        processed: outcomes.len(),
        outcomes,
    }))
}
