//! Custom Axum extractors for session authentication.
//!
//! Provides:
//! - `CurrentUser` — requires a valid session token; rejects with 401.
//! - `MaybeUser` — optional variant for endpoints that only enrich their
//!   response for signed-in users.
//!
//! The token travels either in an `Authorization: Bearer` header or in
//! the [`SESSION_COOKIE`] cookie; the header wins when both are present.
//! Verification is delegated to [`gridpool_sdk::token`].

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, header, request::Parts},
    response::{IntoResponse, Response},
};
use gridpool_sdk::token::{SESSION_COOKIE, SessionClaims, TokenError};
use std::convert::Infallible;

use crate::state::AppState;

/// The verified claims of the calling user.
pub struct CurrentUser(pub SessionClaims);

/// Like [`CurrentUser`], but extraction never fails: an absent or
/// unverifiable token becomes `None`.
pub struct MaybeUser(pub Option<SessionClaims>);

/// Errors that can occur during session extraction.
#[derive(Debug, thiserror::Error)]
pub enum SessionRejection {
    #[error("missing session token")]
    Missing,
    #[error("invalid session token")]
    Invalid,
    #[error("session expired")]
    Expired,
}

impl From<TokenError> for SessionRejection {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => Self::Expired,
            _ => Self::Invalid,
        }
    }
}

impl IntoResponse for SessionRejection {
    fn into_response(self) -> Response {
        let message = match self {
            SessionRejection::Missing => "missing session token",
            SessionRejection::Invalid => "invalid session token",
            SessionRejection::Expired => "session expired",
        };
        (StatusCode::UNAUTHORIZED, message).into_response()
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = SessionRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts).ok_or(SessionRejection::Missing)?;
        let claims = state.session_key.verify(&token)?;
        Ok(Self(claims))
    }
}

impl FromRequestParts<AppState> for MaybeUser {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let claims =
            token_from_parts(parts).and_then(|token| state.session_key.verify(&token).ok());
        Ok(Self(claims))
    }
}

/// Pull the session token out of the request headers.
fn token_from_parts(parts: &Parts) -> Option<String> {
    if let Some(value) = parts.headers.get(header::AUTHORIZATION) {
        if let Some(token) = value.to_str().ok().and_then(|v| v.strip_prefix("Bearer ")) {
            return Some(token.to_owned());
        }
    }
    let cookies = parts.headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_value(cookies, SESSION_COOKIE).map(str::to_owned)
}

/// Find a cookie by name in a `Cookie` header value.
fn cookie_value<'a>(header: &'a str, name: &str) -> Option<&'a str> {
    header.split(';').find_map(|pair| {
        let (key, value) = pair.trim().split_once('=')?;
        (key == name).then_some(value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts_with(name: &str, value: &str) -> Parts {
        let (parts, ()) = axum::http::Request::builder()
            .uri("/")
            .header(name, value)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn cookie_value_finds_the_named_cookie() {
        let header = "theme=dark; gp_session=abc.def; lang=en";
        assert_eq!(cookie_value(header, SESSION_COOKIE), Some("abc.def"));
        assert_eq!(cookie_value(header, "missing"), None);
    }

    #[test]
    fn token_from_cookie_header() {
        let parts = parts_with("Cookie", "gp_session=tok123");
        assert_eq!(token_from_parts(&parts), Some("tok123".to_string()));
    }

    #[test]
    fn bearer_header_wins_over_cookie() {
        let (parts, ()) = axum::http::Request::builder()
            .uri("/")
            .header("Authorization", "Bearer header-tok")
            .header("Cookie", "gp_session=cookie-tok")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(token_from_parts(&parts), Some("header-tok".to_string()));
    }

    #[test]
    fn no_credentials_yields_none() {
        let parts = parts_with("Accept", "application/json");
        assert_eq!(token_from_parts(&parts), None);
    }
}
