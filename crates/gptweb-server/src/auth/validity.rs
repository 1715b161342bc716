//! Session validity chain for refresh-token renewal.

use chrono::{DateTime, Utc};
use gptweb_token::{TokenPayload, constant_time_str_eq};

use crate::storage::Session;

/// Why a loaded session refused a renewal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum SessionCheckError {
    #[error("session is blocked")]
    Blocked,
    #[error("session username does not match token")]
    UserMismatch,
    #[error("session refresh token does not match")]
    TokenMismatch,
    #[error("session has expired")]
    Expired,
}

/// Check a session against the refresh token that located it.
///
/// Conditions are checked in a fixed order and the first failure wins:
/// blocked, username, exact token string, then expiry. Returns the username
/// to mint the new access token for.
pub fn check_session<'a>(
    payload: &'a TokenPayload,
    presented: &str,
    session: &Session,
    now: DateTime<Utc>,
) -> Result<&'a str, SessionCheckError> {
    if session.is_blocked {
        return Err(SessionCheckError::Blocked);
    }
    if session.username != payload.username {
        return Err(SessionCheckError::UserMismatch);
    }
    if !constant_time_str_eq(&session.refresh_token, presented) {
        return Err(SessionCheckError::TokenMismatch);
    }
    if now > session.expires_at {
        return Err(SessionCheckError::Expired);
    }
    Ok(&payload.username)
}
