//! Token payload: who the token authenticates and for how long.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec::random_bytes;
use crate::error::TokenError;

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    /// Short-lived bearer credential for API calls.
    Access,
    /// Long-lived credential accepted only by access-token renewal.
    Refresh,
}

impl std::fmt::Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Access => write!(f, "access"),
            Self::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims carried inside every token.
///
/// `id` is random per token; for refresh tokens it is also the key of the
/// session record created alongside the token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    pub id: Uuid,
    pub username: String,
    #[serde(rename = "token_type")]
    pub kind: TokenKind,
    pub issued_at: DateTime<Utc>,
    pub expired_at: DateTime<Utc>,
}

impl TokenPayload {
    /// Build a payload issued at `now` that expires `duration` later.
    ///
    /// A non-positive `duration` yields a payload that is already expired.
    pub fn new(
        username: &str,
        kind: TokenKind,
        duration: TimeDelta,
        now: DateTime<Utc>,
    ) -> Result<Self, TokenError> {
        let id = uuid::Builder::from_random_bytes(random_bytes()?).into_uuid();
        let expired_at = now
            .checked_add_signed(duration)
            .ok_or(TokenError::DurationOutOfRange)?;

        Ok(Self {
            id,
            username: username.to_string(),
            kind,
            issued_at: now,
            expired_at,
        })
    }

    /// `Expired` once `now` is past `expired_at`.
    pub fn check_valid_at(&self, now: DateTime<Utc>) -> Result<(), TokenError> {
        if now > self.expired_at {
            return Err(TokenError::Expired);
        }
        Ok(())
    }

    /// `WrongKind` unless the token was issued as `expected`.
    pub fn expect_kind(&self, expected: TokenKind) -> Result<(), TokenError> {
        if self.kind != expected {
            return Err(TokenError::WrongKind {
                expected,
                actual: self.kind,
            });
        }
        Ok(())
    }

    pub const fn is_refresh(&self) -> bool {
        matches!(self.kind, TokenKind::Refresh)
    }

    /// Configured lifetime of the token.
    pub fn lifetime(&self) -> TimeDelta {
        self.expired_at - self.issued_at
    }
}
