//! Data models for gateway storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub username: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub full_name: String,
    pub email: String,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Server-side record backing one refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    pub username: String,
    /// The exact refresh token string issued with this session.
    pub refresh_token: String,
    pub user_agent: String,
    pub client_ip: String,
    pub is_blocked: bool,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// Parameters for inserting a user.
pub struct NewUser<'a> {
    pub username: &'a str,
    pub hashed_password: &'a str,
    pub full_name: &'a str,
    pub email: &'a str,
}

/// Parameters for inserting a session.
pub struct NewSession<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub refresh_token: &'a str,
    pub user_agent: &'a str,
    pub client_ip: &'a str,
    pub is_blocked: bool,
    pub expires_at: DateTime<Utc>,
}
