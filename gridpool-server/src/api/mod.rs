//! HTTP API for pools, boards, and internal maintenance.
//!
//! Handlers validate request shapes at this edge with [`validator`] and
//! hand domain decisions (ownership, status gates, claim conflicts) to
//! `gridpool-core`, whose [`PoolError`] values map onto status codes
//! here in one place.

pub mod board;
pub mod extractors;
pub mod internal;
pub mod pools;

use axum::{
    Router,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use gridpool_core::error::PoolError;
use validator::Validate;

use crate::state::AppState;

/// Build the combined API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/api", pools::router().merge(board::router()))
        .merge(internal::router())
}

/// An API failure with its HTTP status.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn internal() -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
    }
}

impl From<PoolError> for ApiError {
    fn from(err: PoolError) -> Self {
        let status = match &err {
            PoolError::PoolNotFound => StatusCode::NOT_FOUND,
            PoolError::Validation(_) => StatusCode::BAD_REQUEST,
            PoolError::WrongStatus { .. }
            | PoolError::AlreadyClaimed { .. }
            | PoolError::CapExceeded { .. }
            | PoolError::NotClaimed { .. } => StatusCode::CONFLICT,
            PoolError::NotOwner | PoolError::NotClaimant { .. } | PoolError::BadInvite => {
                StatusCode::FORBIDDEN
            }
            PoolError::InviteHash(_) | PoolError::Engine(_) | PoolError::Database(_) => {
                tracing::error!(error = %err, "Pool API internal error");
                return Self::internal();
            }
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

/// Reject a request body that fails shape validation.
pub fn validated<T: Validate>(value: T) -> Result<T, ApiError> {
    if let Err(errors) = value.validate() {
        return Err(ApiError::bad_request(errors.to_string()));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_expected_statuses() {
        let cases = [
            (PoolError::PoolNotFound, StatusCode::NOT_FOUND),
            (
                PoolError::Validation("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (PoolError::NotOwner, StatusCode::FORBIDDEN),
            (PoolError::BadInvite, StatusCode::FORBIDDEN),
            (PoolError::CapExceeded { max: 5 }, StatusCode::CONFLICT),
        ];
        for (err, expected) in cases {
            let api_err = ApiError::from(err);
            assert_eq!(api_err.status, expected);
        }
    }

    #[test]
    fn internal_errors_hide_details() {
        let err = ApiError::from(PoolError::InviteHash("salt problem".into()));
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.message, "internal server error");
    }
}
