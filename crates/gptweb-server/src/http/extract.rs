//! Request extractors: caller details and the bearer-token guard.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::header::{AUTHORIZATION, USER_AGENT};
use axum::http::request::Parts;
use gptweb_token::TokenPayload;

use super::AppState;
use crate::auth::AuthError;
use crate::auth::types::ClientInfo;

const BEARER: &str = "bearer";

impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user_agent = parts
            .headers
            .get(USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let client_ip = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
            .await
            .map(|ConnectInfo(addr)| addr.ip().to_string())
            .unwrap_or_default();

        Ok(Self {
            user_agent,
            client_ip,
        })
    }
}

/// Verified access-token payload of the caller.
///
/// Rejects with 401 when the `Authorization` header is missing or is not
/// `Bearer <token>`, and when the token does not verify as an access token.
#[derive(Debug, Clone)]
pub struct AuthPayload(pub TokenPayload);

impl FromRequestParts<AppState> for AuthPayload {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .ok_or(AuthError::Unauthenticated(
                "authorization header is not provided",
            ))?
            .to_str()
            .map_err(|_| AuthError::Unauthenticated("invalid authorization header format"))?;

        let token = bearer_token(header)?;
        state.auth.verify_access_token(token).map(Self)
    }
}

fn bearer_token(header: &str) -> Result<&str, AuthError> {
    let mut fields = header.split_whitespace();
    let (Some(scheme), Some(token), None) = (fields.next(), fields.next(), fields.next()) else {
        return Err(AuthError::Unauthenticated(
            "invalid authorization header format",
        ));
    };
    if !scheme.eq_ignore_ascii_case(BEARER) {
        return Err(AuthError::Unauthenticated("unsupported authorization type"));
    }
    Ok(token)
}
