//! Error taxonomy for the auth service.

use gptweb_core::db::DatabaseError;
use gptweb_token::TokenError;

use super::validity::SessionCheckError;

/// Everything the auth service can fail with.
///
/// Token and session-chain variants are kept apart for logs only. Callers
/// outside the service see them as one authorization failure (see
/// [`AuthError::is_authorization_failure`]).
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken(#[source] TokenError),

    #[error("Session not found")]
    SessionNotFound,

    #[error("Session is blocked")]
    SessionBlocked,

    #[error("Session belongs to a different user")]
    SessionUserMismatch,

    #[error("Session refresh token does not match")]
    SessionTokenMismatch,

    #[error("Session has expired")]
    SessionExpired,

    #[error("Missing or unsupported authorization: {0}")]
    Unauthenticated(&'static str),

    #[error("Session store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("User already exists")]
    UserAlreadyExists,

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Short, stable label for structured logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidToken(_) => "invalid_token",
            Self::SessionNotFound => "session_not_found",
            Self::SessionBlocked => "session_blocked",
            Self::SessionUserMismatch => "session_user_mismatch",
            Self::SessionTokenMismatch => "session_token_mismatch",
            Self::SessionExpired => "session_expired",
            Self::Unauthenticated(_) => "unauthenticated",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::ConfigInvalid(_) => "config_invalid",
            Self::UserNotFound => "user_not_found",
            Self::InvalidCredentials => "invalid_credentials",
            Self::UserAlreadyExists => "user_already_exists",
            Self::Validation(_) => "validation",
            Self::Internal(_) => "internal",
        }
    }

    /// Whether the error is a rejected token or session.
    pub const fn is_authorization_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidToken(_)
                | Self::SessionNotFound
                | Self::SessionBlocked
                | Self::SessionUserMismatch
                | Self::SessionTokenMismatch
                | Self::SessionExpired
                | Self::Unauthenticated(_)
        )
    }
}

impl From<SessionCheckError> for AuthError {
    fn from(e: SessionCheckError) -> Self {
        match e {
            SessionCheckError::Blocked => Self::SessionBlocked,
            SessionCheckError::UserMismatch => Self::SessionUserMismatch,
            SessionCheckError::TokenMismatch => Self::SessionTokenMismatch,
            SessionCheckError::Expired => Self::SessionExpired,
        }
    }
}

impl From<DatabaseError> for AuthError {
    fn from(e: DatabaseError) -> Self {
        Self::StoreUnavailable(e.to_string())
    }
}
