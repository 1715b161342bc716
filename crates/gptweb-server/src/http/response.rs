//! Response envelope and error mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::auth::AuthError;

/// Body of every response: `{"code", "errorMsg", "data"}`.
///
/// `code` repeats the HTTP status. `data` is `null` on errors.
#[derive(Debug, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub code: u16,
    #[serde(rename = "errorMsg")]
    pub error_msg: String,
    pub data: Option<T>,
}

/// Successful response wrapping `T` in the envelope.
pub struct ApiResponse<T>(pub T);

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let body = Envelope {
            code: StatusCode::OK.as_u16(),
            error_msg: String::new(),
            data: Some(self.0),
        };
        (StatusCode::OK, Json(body)).into_response()
    }
}

impl AuthError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::InvalidToken(_)
            | Self::SessionNotFound
            | Self::SessionBlocked
            | Self::SessionUserMismatch
            | Self::SessionTokenMismatch
            | Self::SessionExpired
            | Self::Unauthenticated(_)
            | Self::InvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::UserNotFound => StatusCode::NOT_FOUND,
            Self::UserAlreadyExists => StatusCode::FORBIDDEN,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::StoreUnavailable(_) | Self::ConfigInvalid(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Message shown to clients. Rejected tokens and sessions all read the
    /// same, and server-side failures carry no detail.
    fn public_message(&self) -> String {
        match self {
            Self::Unauthenticated(reason) => (*reason).to_string(),
            e if e.is_authorization_failure() => "unauthorized".to_string(),
            Self::StoreUnavailable(_) | Self::ConfigInvalid(_) | Self::Internal(_) => {
                "internal server error".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body: Envelope<()> = Envelope {
            code: status.as_u16(),
            error_msg: self.public_message(),
            data: None,
        };
        (status, Json(body)).into_response()
    }
}
