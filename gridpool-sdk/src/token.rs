//! Keyed-HMAC session tokens.
//!
//! Gridpool does not issue credentials itself; an upstream identity layer
//! authenticates users and mints a session token that this module can
//! verify. The wire format is:
//!
//! ```text
//! {base64url(claims_json)}.{base64url(signature)}
//! ```
//!
//! where `signature = HMAC-SHA256(claims_json, key)`. Tokens travel either
//! in the [`SESSION_COOKIE`] cookie or an `Authorization: Bearer` header.
//!
//! The signing key is constructed once at startup from the configured
//! secret and rejected immediately if the secret is too short, so a
//! misconfigured deployment fails at boot rather than at the first login.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cookie name carrying the session token.
pub const SESSION_COOKIE: &str = "gp_session";

/// Lifetime of an issued session, in seconds.
pub const SESSION_TTL: i64 = 24 * 60 * 60;

/// Minimum length of the HMAC secret, in bytes.
pub const MIN_KEY_LEN: usize = 32;

/// Errors produced by token issue/verify operations.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("session secret must be at least {MIN_KEY_LEN} bytes, got {0}")]
    KeyTooShort(usize),
    #[error("invalid token format")]
    InvalidFormat,
    #[error("invalid base64 encoding")]
    InvalidBase64,
    #[error("invalid claims json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid signature")]
    SignatureMismatch,
    #[error("session expired")]
    Expired,
}

impl From<ring::error::Unspecified> for TokenError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// The authenticated payload of a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Stable identifier of the user in the upstream identity layer.
    pub user_id: Uuid,
    /// Display name, stamped onto claimed squares.
    pub name: String,
    /// Contact email, stamped onto claimed squares.
    pub email: String,
    /// Unix timestamp (seconds) after which the token is rejected.
    pub expires_at: i64,
}

/// A validated HMAC-SHA256 signing key for session tokens.
#[derive(Debug, Clone)]
pub struct SessionKey {
    key: ring::hmac::Key,
}

impl SessionKey {
    /// Build a key from the configured secret.
    ///
    /// Secrets shorter than [`MIN_KEY_LEN`] bytes are rejected.
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        if secret.len() < MIN_KEY_LEN {
            return Err(TokenError::KeyTooShort(secret.len()));
        }
        Ok(Self {
            key: ring::hmac::Key::new(ring::hmac::HMAC_SHA256, secret),
        })
    }

    /// Issue a token for `user_id` expiring [`SESSION_TTL`] seconds from now.
    pub fn issue(&self, user_id: Uuid, name: &str, email: &str) -> Result<String, TokenError> {
        let claims = SessionClaims {
            user_id,
            name: name.to_owned(),
            email: email.to_owned(),
            expires_at: time::OffsetDateTime::now_utc().unix_timestamp() + SESSION_TTL,
        };
        self.sign(&claims)
    }

    /// Serialize and sign an explicit claims value.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, TokenError> {
        let json = serde_json::to_string(claims)?;
        let signature = ring::hmac::sign(&self.key, json.as_bytes());
        Ok(format!(
            "{}.{}",
            fast32::base64::RFC4648_URL_NOPAD.encode(json.as_bytes()),
            fast32::base64::RFC4648_URL_NOPAD.encode(signature.as_ref()),
        ))
    }

    /// Verify a token's signature and expiry, returning its claims.
    ///
    /// The HMAC is checked before the claims JSON is parsed, so malformed
    /// payloads from anyone without the key never reach the deserializer.
    pub fn verify(&self, token: &str) -> Result<SessionClaims, TokenError> {
        let dot_pos = token.find('.').ok_or(TokenError::InvalidFormat)?;
        let json = fast32::base64::RFC4648_URL_NOPAD
            .decode_str(&token[..dot_pos])
            .map_err(|_| TokenError::InvalidBase64)?;
        let signature = fast32::base64::RFC4648_URL_NOPAD
            .decode_str(&token[dot_pos + 1..])
            .map_err(|_| TokenError::InvalidBase64)?;
        ring::hmac::verify(&self.key, &json, &signature)?;
        let claims: SessionClaims = serde_json::from_slice(&json)?;
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        if claims.expires_at <= now {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_key() -> SessionKey {
        SessionKey::new(b"0123456789abcdef0123456789abcdef").unwrap()
    }

    fn now() -> i64 {
        time::OffsetDateTime::now_utc().unix_timestamp()
    }

    #[test]
    fn issue_verify_round_trip() {
        let key = test_key();
        let user = Uuid::new_v4();
        let token = key.issue(user, "Pat", "pat@example.com").unwrap();
        let claims = key.verify(&token).unwrap();
        assert_eq!(claims.user_id, user);
        assert_eq!(claims.name, "Pat");
        assert_eq!(claims.email, "pat@example.com");
        assert!(claims.expires_at > now());
    }

    #[test]
    fn short_secret_rejected() {
        let err = SessionKey::new(b"too-short").unwrap_err();
        assert!(matches!(err, TokenError::KeyTooShort(9)));
    }

    #[test]
    fn expired_token_rejected() {
        let key = test_key();
        let claims = SessionClaims {
            user_id: Uuid::new_v4(),
            name: "Pat".into(),
            email: "pat@example.com".into(),
            expires_at: now() - 10,
        };
        let token = key.sign(&claims).unwrap();
        assert!(matches!(key.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn tampered_claims_rejected() {
        let key = test_key();
        let token = key
            .issue(Uuid::new_v4(), "Pat", "pat@example.com")
            .unwrap();
        let dot = token.find('.').unwrap();
        let mut claims: SessionClaims = serde_json::from_slice(
            &fast32::base64::RFC4648_URL_NOPAD
                .decode_str(&token[..dot])
                .unwrap(),
        )
        .unwrap();
        claims.user_id = Uuid::new_v4();
        let forged_json = serde_json::to_string(&claims).unwrap();
        let forged = format!(
            "{}.{}",
            fast32::base64::RFC4648_URL_NOPAD.encode(forged_json.as_bytes()),
            &token[dot + 1..],
        );
        assert!(matches!(
            key.verify(&forged),
            Err(TokenError::SignatureMismatch)
        ));
    }

    #[test]
    fn wrong_key_rejected() {
        let token = test_key()
            .issue(Uuid::new_v4(), "Pat", "pat@example.com")
            .unwrap();
        let other = SessionKey::new(b"ffffffffffffffffffffffffffffffff").unwrap();
        assert!(matches!(
            other.verify(&token),
            Err(TokenError::SignatureMismatch)
        ));
    }

    #[test]
    fn garbage_rejected() {
        let key = test_key();
        assert!(matches!(
            key.verify("no-separator"),
            Err(TokenError::InvalidFormat)
        ));
        assert!(matches!(
            key.verify("{not-base64}.{either}"),
            Err(TokenError::InvalidBase64)
        ));
    }
}
