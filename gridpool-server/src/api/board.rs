//! Board and square API handlers.
//!
//! # Endpoints
//!
//! - `GET    /pools/{pool_id}/board`   – full board state in one response
//! - `GET    /pools/{pool_id}/winners` – resolved winners per score line
//! - `POST   /pools/{pool_id}/squares/claim`      – claim a batch of squares (auth)
//! - `DELETE /pools/{pool_id}/squares/{row}/{col}` – release one claimed square (auth)
//! - `POST   /pools/{pool_id}/clear`   – release every claim on the board (owner)

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use gridpool_core::engine::resolve_winners;
use gridpool_core::entities::PoolStatus;
use gridpool_core::entities::axis::AxisAssignment;
use gridpool_core::entities::pool::Pool;
use gridpool_core::entities::score::Score;
use gridpool_core::entities::square::Square;
use gridpool_core::error::PoolError;
use gridpool_core::ledger::Claimant;
use gridpool_sdk::objects::board::{
    BoardResponse, CellRef, ClaimSquaresRequest, ClaimSquaresResponse, ClearBoardResponse,
};
use gridpool_sdk::objects::winner::WinnersResponse;
use uuid::Uuid;

use crate::api::extractors::{CurrentUser, MaybeUser};
use crate::api::{ApiError, validated};
use crate::state::AppState;

/// Build the board API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/pools/{pool_id}/board", get(get_board))
        .route("/pools/{pool_id}/winners", get(get_winners))
        .route("/pools/{pool_id}/squares/claim", post(claim_squares))
        .route(
            "/pools/{pool_id}/squares/{row}/{col}",
            delete(unclaim_square),
        )
        .route("/pools/{pool_id}/clear", post(clear_board))
}

// ---------------------------------------------------------------------------
// GET /pools/{pool_id}/board
// ---------------------------------------------------------------------------

/// `GET /pools/{pool_id}/board` — the pool, all hundred squares, the axis
/// digits once drawn, and any recorded scores.
///
/// With a session the response also carries how many squares the caller
/// holds, so clients can show the remaining allowance.
async fn get_board(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    Path(pool_id): Path<Uuid>,
) -> Result<Json<BoardResponse>, ApiError> {
    let pool = Pool::find_by_id(&state.db, pool_id)
        .await
        .map_err(PoolError::from)?
        .ok_or(PoolError::PoolNotFound)?;
    let squares = Square::list_for_pool(&state.db, pool_id)
        .await
        .map_err(PoolError::from)?;
    let axis = AxisAssignment::get(&state.db, pool_id)
        .await
        .map_err(PoolError::from)?;
    let scores = Score::list_for_pool(&state.db, pool_id)
        .await
        .map_err(PoolError::from)?;

    let user_square_count = match &user {
        Some(claims) => Some(
            state
                .ledger
                .user_square_count(pool_id, claims.user_id)
                .await?,
        ),
        None => None,
    };

    Ok(Json(BoardResponse {
        pool: pool.into(),
        squares: squares.into_iter().map(Into::into).collect(),
        axis: axis.map(Into::into),
        scores: scores.into_iter().map(Into::into).collect(),
        user_square_count,
    }))
}

// ---------------------------------------------------------------------------
// GET /pools/{pool_id}/winners
// ---------------------------------------------------------------------------

/// `GET /pools/{pool_id}/winners` — the winning square and claimant for
/// every recorded score line, in bucket order.
///
/// Only meaningful once the axes exist, so pools that are not yet
/// numbered (or completed) are rejected.
async fn get_winners(
    State(state): State<AppState>,
    Path(pool_id): Path<Uuid>,
) -> Result<Json<WinnersResponse>, ApiError> {
    let pool = Pool::find_by_id(&state.db, pool_id)
        .await
        .map_err(PoolError::from)?
        .ok_or(PoolError::PoolNotFound)?;
    if !matches!(pool.status, PoolStatus::Numbered | PoolStatus::Completed) {
        return Err(PoolError::WrongStatus {
            required: "numbered",
            actual: pool.status,
        }
        .into());
    }

    let axis = AxisAssignment::get(&state.db, pool_id)
        .await
        .map_err(PoolError::from)?
        .ok_or_else(|| {
            tracing::error!(%pool_id, "numbered pool has no axis assignment");
            ApiError::internal()
        })?;
    let scores = Score::list_for_pool(&state.db, pool_id)
        .await
        .map_err(PoolError::from)?;
    let squares = Square::list_for_pool(&state.db, pool_id)
        .await
        .map_err(PoolError::from)?;

    let winners = resolve_winners(&scores, &axis, &squares).map_err(PoolError::from)?;
    Ok(Json(WinnersResponse { winners }))
}

// ---------------------------------------------------------------------------
// POST /pools/{pool_id}/squares/claim
// ---------------------------------------------------------------------------

/// `POST /pools/{pool_id}/squares/claim` — claim a batch of squares for
/// the calling user. All or nothing.
async fn claim_squares(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pool_id): Path<Uuid>,
    Json(request): Json<ClaimSquaresRequest>,
) -> Result<Json<ClaimSquaresResponse>, ApiError> {
    let request = validated(request)?;
    let claimant = Claimant {
        user_id: user.user_id,
        name: user.name,
        email: user.email,
    };
    let claimed = state
        .ledger
        .claim(pool_id, &claimant, &request.squares)
        .await?;
    Ok(Json(ClaimSquaresResponse { claimed }))
}

// ---------------------------------------------------------------------------
// DELETE /pools/{pool_id}/squares/{row}/{col}
// ---------------------------------------------------------------------------

/// `DELETE /pools/{pool_id}/squares/{row}/{col}` — release one square the
/// calling user claimed earlier.
async fn unclaim_square(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path((pool_id, row, col)): Path<(Uuid, u8, u8)>,
) -> Result<StatusCode, ApiError> {
    let cell = validated(CellRef { row, col })?;
    state.ledger.unclaim(pool_id, user.user_id, cell).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// POST /pools/{pool_id}/clear
// ---------------------------------------------------------------------------

/// `POST /pools/{pool_id}/clear` — release every claim on the board.
/// Owner only; works in any status.
async fn clear_board(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(pool_id): Path<Uuid>,
) -> Result<Json<ClearBoardResponse>, ApiError> {
    let cleared = state.ledger.clear_board(pool_id, user.user_id).await?;
    Ok(Json(ClearBoardResponse { cleared }))
}
