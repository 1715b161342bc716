//! Route handlers.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde_json::{Value, json};

use super::AppState;
use super::extract::AuthPayload;
use super::response::ApiResponse;
use crate::auth::AuthError;
use crate::auth::types::{
    ClientInfo, LoginRequest, LoginResponse, RegisterRequest, RenewAccessRequest,
    RenewAccessResponse, UserResponse,
};
use gptweb_token::TokenPayload;

type ApiResult<T> = Result<ApiResponse<T>, AuthError>;

fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    payload
        .map(|Json(req)| req)
        .map_err(|rejection| AuthError::Validation(rejection.body_text()))
}

/// `GET /health`
pub async fn health() -> ApiResponse<Value> {
    ApiResponse(json!({ "status": "ok" }))
}

/// `POST /register`
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let req = body(payload)?;
    state.auth.register(req).await.map(ApiResponse)
}

/// `POST /login`
pub async fn login(
    State(state): State<AppState>,
    client: ClientInfo,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<LoginResponse> {
    let req = body(payload)?;
    state.auth.login(req, client).await.map(ApiResponse)
}

/// `POST /tokens/renew_access`
pub async fn renew_access(
    State(state): State<AppState>,
    payload: Result<Json<RenewAccessRequest>, JsonRejection>,
) -> ApiResult<RenewAccessResponse> {
    let req = body(payload)?;
    state.auth.renew_access(req).await.map(ApiResponse)
}

/// `GET /whoami`, the access-token guarded route.
pub async fn whoami(AuthPayload(payload): AuthPayload) -> ApiResponse<TokenPayload> {
    ApiResponse(payload)
}
