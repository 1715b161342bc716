use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::connect_info::MockConnectInfo;
use axum::http::{Method, Request, StatusCode};
use chrono::TimeDelta;
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use gptweb_server::auth::{AuthService, TokenDurations};
use gptweb_server::http::{AppState, build_cors_layer, build_router};
use gptweb_server::storage::GatewayDatabase;
use gptweb_token::PasetoMaker;

const TEST_KEY: &[u8] = b"12345678901234567890123456789012";

async fn app() -> (axum::Router, GatewayDatabase) {
    app_with_origins(&[]).await
}

async fn app_with_origins(origins: &[String]) -> (axum::Router, GatewayDatabase) {
    let db = GatewayDatabase::open_in_memory().await.unwrap();
    let tokens = Arc::new(PasetoMaker::new(TEST_KEY).unwrap());
    let durations = TokenDurations {
        access: TimeDelta::minutes(15),
        refresh: TimeDelta::days(7),
    };
    let auth = Arc::new(AuthService::with_database(db.clone(), tokens, durations));
    let cors = build_cors_layer(origins).unwrap();
    let router = build_router(AppState { auth }, cors)
        .layer(MockConnectInfo(SocketAddr::from(([203, 0, 113, 7], 51000))));
    (router, db)
}

/// Send a request and return (status, parsed envelope).
async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    headers: &[(&str, &str)],
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    for &(name, value) in headers {
        builder = builder.header(name, value);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let resp = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn post(app: &axum::Router, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, uri, &[("user-agent", "curl/8.5.0")], Some(body)).await
}

async fn register_and_login(app: &axum::Router) -> Value {
    let (status, _) = post(
        app,
        "/register",
        json!({
            "username": "alice",
            "password": "secret123",
            "full_name": "Alice Liddell",
            "email": "alice@example.com",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(
        app,
        "/login",
        json!({ "username": "alice", "password": "secret123" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["data"].clone()
}

#[tokio::test]
async fn health_uses_envelope() {
    let (app, _) = app().await;
    let (status, body) = send(&app, Method::GET, "/health", &[], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
    assert_eq!(body["errorMsg"], "");
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn register_hides_password_hash() {
    let (app, _) = app().await;
    let (status, body) = post(
        &app,
        "/register",
        json!({
            "username": "alice",
            "password": "secret123",
            "full_name": "Alice Liddell",
            "email": "alice@example.com",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");
    assert!(body["data"].get("hashed_password").is_none());
}

#[tokio::test]
async fn register_duplicate_is_forbidden() {
    let (app, _) = app().await;
    register_and_login(&app).await;

    let (status, body) = post(
        &app,
        "/register",
        json!({
            "username": "alice",
            "password": "secret123",
            "full_name": "Alice Again",
            "email": "alice2@example.com",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["code"], 403);
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn bad_json_is_bad_request() {
    let (app, _) = app().await;
    let (status, body) = post(&app, "/login", json!({ "username": "alice" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 400);
    assert!(!body["errorMsg"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn login_records_client_details() {
    let (app, db) = app().await;
    let data = register_and_login(&app).await;

    assert_eq!(data["user"]["username"], "alice");
    let session_id: Uuid = data["session_id"].as_str().unwrap().parse().unwrap();
    let session = db.get_session(&session_id).await.unwrap();
    assert_eq!(session.client_ip, "203.0.113.7");
    assert_eq!(session.user_agent, "curl/8.5.0");
    assert_eq!(session.refresh_token, data["refresh_token"].as_str().unwrap());
}

#[tokio::test]
async fn login_failures_map_to_status() {
    let (app, _) = app().await;
    register_and_login(&app).await;

    let (status, _) = post(
        &app,
        "/login",
        json!({ "username": "nobody", "password": "secret123" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(
        &app,
        "/login",
        json!({ "username": "alice", "password": "wrongpass" }),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn renew_access_returns_new_access_token() {
    let (app, _) = app().await;
    let data = register_and_login(&app).await;

    let (status, body) = post(
        &app,
        "/tokens/renew_access",
        json!({ "refresh_token": data["refresh_token"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_ne!(body["data"]["access_token"], data["access_token"]);
    assert!(body["data"]["access_token_expires_at"].is_string());
    assert!(body["data"].get("refresh_token").is_none());
}

#[tokio::test]
async fn renewal_rejections_look_identical() {
    let (app, db) = app().await;
    let data = register_and_login(&app).await;

    let (garbage_status, garbage) = post(
        &app,
        "/tokens/renew_access",
        json!({ "refresh_token": "v2.local.garbage" }),
    )
    .await;

    let session_id: Uuid = data["session_id"].as_str().unwrap().parse().unwrap();
    db.block_session(&session_id).await.unwrap();
    let (blocked_status, blocked) = post(
        &app,
        "/tokens/renew_access",
        json!({ "refresh_token": data["refresh_token"] }),
    )
    .await;

    assert_eq!(garbage_status, StatusCode::UNAUTHORIZED);
    assert_eq!(blocked_status, StatusCode::UNAUTHORIZED);
    assert_eq!(garbage, blocked);
    assert_eq!(blocked["errorMsg"], "unauthorized");
}

#[tokio::test]
async fn whoami_requires_bearer_access_token() {
    let (app, _) = app().await;
    let data = register_and_login(&app).await;
    let access = data["access_token"].as_str().unwrap();

    let (status, body) = send(&app, Method::GET, "/whoami", &[], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errorMsg"], "authorization header is not provided");

    let basic = format!("Basic {access}");
    let (status, body) = send(&app, Method::GET, "/whoami", &[("authorization", &basic)], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errorMsg"], "unsupported authorization type");

    let (status, _) = send(
        &app,
        Method::GET,
        "/whoami",
        &[("authorization", "Bearer v2.local.forged")],
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let refresh = format!("Bearer {}", data["refresh_token"].as_str().unwrap());
    let (status, body) = send(&app, Method::GET, "/whoami", &[("authorization", &refresh)], None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["errorMsg"], "unauthorized");

    let bearer = format!("bearer {access}");
    let (status, body) = send(&app, Method::GET, "/whoami", &[("authorization", &bearer)], None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["username"], "alice");
}

/// Send a CORS preflight for `POST /login` from `origin`.
async fn preflight(app: &axum::Router, origin: &str) -> axum::response::Response {
    let req = Request::builder()
        .method(Method::OPTIONS)
        .uri("/login")
        .header("origin", origin)
        .header("access-control-request-method", "POST")
        .header("access-control-request-headers", "content-type")
        .body(Body::empty())
        .unwrap();
    app.clone().oneshot(req).await.unwrap()
}

#[tokio::test]
async fn preflight_allows_any_origin_by_default() {
    let (app, _) = app().await;
    let resp = preflight(&app, "https://chat.example.com").await;

    assert_eq!(resp.status(), StatusCode::OK);
    let headers = resp.headers();
    assert_eq!(headers["access-control-allow-origin"], "*");
    let methods = headers["access-control-allow-methods"].to_str().unwrap();
    assert!(methods.contains("POST"), "{methods}");
}

#[tokio::test]
async fn configured_origins_are_enforced() {
    let (app, _) = app_with_origins(&["https://chat.example.com".to_string()]).await;

    let allowed = preflight(&app, "https://chat.example.com").await;
    assert_eq!(
        allowed.headers()["access-control-allow-origin"],
        "https://chat.example.com"
    );

    let denied = preflight(&app, "https://evil.example").await;
    assert!(!denied.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn simple_requests_carry_cors_header() {
    let (app, _) = app().await;
    let req = Request::builder()
        .uri("/health")
        .header("origin", "https://chat.example.com")
        .body(Body::empty())
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()["access-control-allow-origin"], "*");
}
