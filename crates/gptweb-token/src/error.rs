//! Token error types.

use crate::payload::TokenKind;

/// Errors from token construction, issuance and verification.
///
/// Verification failures (`Malformed`, `Authentication`, `Expired`,
/// `WrongKind`) stay distinct for logging; callers are expected to collapse
/// them into a single "invalid token" answer.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },

    #[error("Malformed token: {0}")]
    Malformed(String),

    #[error("Token authentication failed")]
    Authentication,

    #[error("Token has expired")]
    Expired,

    #[error("Wrong token kind: expected {expected}, got {actual}")]
    WrongKind {
        expected: TokenKind,
        actual: TokenKind,
    },

    #[error("Randomness source failed: {0}")]
    Randomness(String),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Token duration is out of range")]
    DurationOutOfRange,
}

impl TokenError {
    /// Short, stable label for structured logs.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidKeyLength { .. } => "invalid_key_length",
            Self::Malformed(_) => "malformed",
            Self::Authentication => "authentication",
            Self::Expired => "expired",
            Self::WrongKind { .. } => "wrong_kind",
            Self::Randomness(_) => "randomness",
            Self::EncryptionFailed(_) => "encryption",
            Self::SerializationError(_) => "serialization",
            Self::DurationOutOfRange => "duration_out_of_range",
        }
    }

    /// Whether this error came from verifying a presented token.
    pub const fn is_verification_failure(&self) -> bool {
        matches!(
            self,
            Self::Malformed(_) | Self::Authentication | Self::Expired | Self::WrongKind { .. }
        )
    }
}
