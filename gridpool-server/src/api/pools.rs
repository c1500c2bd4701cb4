//! Pool API handlers.
//!
//! # Endpoints
//!
//! - `POST   /pools`                    – create a pool (auth)
//! - `GET    /pools`                    – list pools, `?owner=me` / `?member=me` filters
//! - `GET    /pools/{pool_id}`          – fetch one pool
//! - `PATCH  /pools/{pool_id}`          – apply settings changes (owner)
//! - `DELETE /pools/{pool_id}`          – delete a pool (owner)
//! - `POST   /pools/{pool_id}/join`     – verify a private pool's invite code
//! - `GET    /pools/{pool_id}/events`   – audit log, newest first (owner)
//! - `POST   /pools/{pool_id}/lock`     – open → locked (owner)
//! - `POST   /pools/{pool_id}/unlock`   – locked → open (owner)
//! - `POST   /pools/{pool_id}/randomize`   – draw axis digits, locked → numbered (owner)
//! - `POST   /pools/{pool_id}/unrandomize` – discard axis digits, numbered → locked (owner)
//! - `PUT    /pools/{pool_id}/scores`   – set and clear score lines (owner)

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use gridpool_core::entities::Visibility;
use gridpool_core::entities::event::EventRecord;
use gridpool_core::entities::pool::Pool;
use gridpool_core::error::PoolError;
use gridpool_sdk::objects::board::AxisResponse;
use gridpool_sdk::objects::event::EventListResponse;
use gridpool_sdk::objects::pool::{
    CreatePoolRequest, CreatePoolResponse, JoinPoolRequest, JoinPoolResponse, PoolListResponse,
    PoolResponse, UpdatePoolRequest,
};
use gridpool_sdk::objects::score::{ScoreUpdateRequest, ScoresResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::extractors::{CurrentUser, MaybeUser};
use crate::api::{ApiError, validated};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u32 = 20;
const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_EVENT_LIMIT: u32 = 100;
const MAX_EVENT_LIMIT: u32 = 500;

/// Build the pool API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pools", post(create_pool).get(list_pools))
        .route(
            "/pools/{pool_id}",
            get(get_pool).patch(update_pool).delete(delete_pool),
        )
        .route("/pools/{pool_id}/join", post(join_pool))
        .route("/pools/{pool_id}/events", get(list_events))
        .route("/pools/{pool_id}/lock", post(lock_pool))
        .route("/pools/{pool_id}/unlock", post(unlock_pool))
        .route("/pools/{pool_id}/randomize", post(randomize_pool))
        .route("/pools/{pool_id}/unrandomize", post(unrandomize_pool))
        .route("/pools/{pool_id}/scores", put(update_scores))
}

// ---------------------------------------------------------------------------
// POST /pools
// ---------------------------------------------------------------------------

/// `POST /pools` — create a pool owned by the calling user.
///
/// The response carries the plaintext invite code for a private pool;
/// it is never retrievable again.
async fn create_pool(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<CreatePoolRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let request = validated(request)?;
    let (pool, invite_code) = state.lifecycle.create(user.user_id, request).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatePoolResponse {
            pool: pool.into(),
            invite_code,
        }),
    ))
}

// ---------------------------------------------------------------------------
// GET /pools
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ListQuery {
    limit: Option<u32>,
    offset: Option<u32>,
    /// `me` restricts the listing to pools the caller owns.
    owner: Option<String>,
    /// `me` restricts the listing to pools where the caller holds a square.
    member: Option<String>,
}

/// `GET /pools` — list public pools, newest first.
///
/// With `?owner=me` or `?member=me` and a session, lists the caller's
/// own pools instead (including private ones).
async fn list_pools(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<PoolListResponse>, ApiError> {
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE).min(MAX_PAGE_SIZE);
    let offset = query.offset.unwrap_or(0);

    let pools = match (query.owner.as_deref(), query.member.as_deref()) {
        (Some("me"), _) => {
            let user = user.ok_or_else(|| ApiError::unauthorized("owner=me requires a session"))?;
            Pool::list_by_owner(&state.db, user.user_id, limit, offset).await
        }
        (None, Some("me")) => {
            let user =
                user.ok_or_else(|| ApiError::unauthorized("member=me requires a session"))?;
            Pool::list_by_member(&state.db, user.user_id, limit, offset).await
        }
        (None, None) => Pool::list_public(&state.db, limit, offset).await,
        _ => {
            return Err(ApiError::bad_request(
                "owner and member filters only accept \"me\"",
            ));
        }
    };
    let pools = pools.map_err(PoolError::from)?;

    Ok(Json(PoolListResponse {
        pools: pools.into_iter().map(Into::into).collect(),
    }))
}

// ---------------------------------------------------------------------------
// GET /pools/{pool_id}
// ---------------------------------------------------------------------------

/// `GET /pools/{pool_id}` — fetch one pool.
///
/// Private pools are indistinguishable from missing ones for everybody
/// but their owner.
async fn get_pool(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(pool_id): Path<Uuid>,
) -> Result<Json<PoolResponse>, ApiError> {
    let pool = Pool::find_by_id(&state.db, pool_id)
        .await
        .map_err(PoolError::from)?
        .ok_or(PoolError::PoolNotFound)?;

    if pool.visibility == Visibility::Private && user.map(|u| u.user_id) != Some(pool.owner_id) {
        return Err(PoolError::PoolNotFound.into());
    }

    Ok(Json(PoolResponse { pool: pool.into() }))
}

// ---------------------------------------------------------------------------
// PATCH /pools/{pool_id}
// ---------------------------------------------------------------------------

/// `PATCH /pools/{pool_id}` — apply an explicit list of settings changes.
///
/// Only the owner, and only while the pool is open.
async fn update_pool(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pool_id): Path<Uuid>,
    Json(request): Json<UpdatePoolRequest>,
) -> Result<Json<PoolResponse>, ApiError> {
    let request = validated(request)?;
    let pool = state
        .lifecycle
        .update_settings(pool_id, user.user_id, &request.changes)
        .await?;
    Ok(Json(PoolResponse { pool: pool.into() }))
}

// ---------------------------------------------------------------------------
// DELETE /pools/{pool_id}
// ---------------------------------------------------------------------------

/// `DELETE /pools/{pool_id}` — delete a pool and everything under it.
async fn delete_pool(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pool_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state.lifecycle.delete(pool_id, user.user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /pools/{pool_id}/join
// ---------------------------------------------------------------------------

/// `POST /pools/{pool_id}/join` — verify a private pool's invite code.
///
/// No session required; a correct code is the whole gate. Returns a
/// summary of the pool so the client can render a join screen.
async fn join_pool(
    State(state): State<AppState>,
    Path(pool_id): Path<Uuid>,
    Json(request): Json<JoinPoolRequest>,
) -> Result<Json<JoinPoolResponse>, ApiError> {
    let request = validated(request)?;
    let summary = state
        .lifecycle
        .verify_invite(pool_id, &request.invite_code)
        .await?;
    Ok(Json(JoinPoolResponse { pool: summary }))
}

// ---------------------------------------------------------------------------
// GET /pools/{pool_id}/events
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct EventsQuery {
    limit: Option<u32>,
}

/// `GET /pools/{pool_id}/events` — the pool's audit log, newest first.
async fn list_events(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pool_id): Path<Uuid>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<EventListResponse>, ApiError> {
    let pool = Pool::find_by_id(&state.db, pool_id)
        .await
        .map_err(PoolError::from)?
        .ok_or(PoolError::PoolNotFound)?;
    if pool.owner_id != user.user_id {
        return Err(PoolError::NotOwner.into());
    }

    let limit = query.limit.unwrap_or(DEFAULT_EVENT_LIMIT).min(MAX_EVENT_LIMIT);
    let events = EventRecord::list_for_pool(&state.db, pool_id, limit)
        .await
        .map_err(PoolError::from)?;

    Ok(Json(EventListResponse {
        events: events.into_iter().map(Into::into).collect(),
    }))
}

// ---------------------------------------------------------------------------
// Status transitions
// ---------------------------------------------------------------------------

/// `POST /pools/{pool_id}/lock` — stop claims, open → locked.
async fn lock_pool(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pool_id): Path<Uuid>,
) -> Result<Json<PoolResponse>, ApiError> {
    let pool = state.lifecycle.lock(pool_id, user.user_id).await?;
    Ok(Json(PoolResponse { pool: pool.into() }))
}

/// `POST /pools/{pool_id}/unlock` — reopen claims, locked → open.
async fn unlock_pool(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pool_id): Path<Uuid>,
) -> Result<Json<PoolResponse>, ApiError> {
    let pool = state.lifecycle.unlock(pool_id, user.user_id).await?;
    Ok(Json(PoolResponse { pool: pool.into() }))
}

/// `POST /pools/{pool_id}/randomize` — draw both axes, locked → numbered.
async fn randomize_pool(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pool_id): Path<Uuid>,
) -> Result<Json<AxisResponse>, ApiError> {
    let axis = state.lifecycle.randomize(pool_id, user.user_id).await?;
    Ok(Json(AxisResponse { axis: axis.into() }))
}

/// `POST /pools/{pool_id}/unrandomize` — discard the axes, numbered → locked.
async fn unrandomize_pool(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pool_id): Path<Uuid>,
) -> Result<Json<PoolResponse>, ApiError> {
    let pool = state.lifecycle.unrandomize(pool_id, user.user_id).await?;
    Ok(Json(PoolResponse { pool: pool.into() }))
}

// ---------------------------------------------------------------------------
// PUT /pools/{pool_id}/scores
// ---------------------------------------------------------------------------

/// `PUT /pools/{pool_id}/scores` — set and clear score lines.
///
/// Returns every score still stored after the update, in bucket order.
async fn update_scores(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pool_id): Path<Uuid>,
    Json(request): Json<ScoreUpdateRequest>,
) -> Result<Json<ScoresResponse>, ApiError> {
    let request = validated(request)?;
    let scores = state
        .lifecycle
        .update_scores(pool_id, user.user_id, &request.set, &request.clear)
        .await?;
    Ok(Json(ScoresResponse {
        scores: scores.into_iter().map(Into::into).collect(),
    }))
}
