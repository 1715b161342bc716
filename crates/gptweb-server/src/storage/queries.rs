//! Database queries for the gateway.

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::db::GatewayDatabase;
use super::models::{NewSession, NewUser, Session, User};
use crate::auth::store::{CredentialStore, SessionStore};
use gptweb_core::db::DatabaseError;

impl GatewayDatabase {
    // =========================================================================
    // User queries
    // =========================================================================

    /// Create a new user, returning the stored row.
    pub async fn create_user(&self, params: &NewUser<'_>) -> Result<User, DatabaseError> {
        let now = Utc::now();

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, hashed_password, full_name, email, password_changed_at, created_at) VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(params.username)
        .bind(params.hashed_password)
        .bind(params.full_name)
        .bind(params.email)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool())
        .await?;

        Ok(user)
    }

    /// Get a user by username.
    pub async fn get_user(&self, username: &str) -> Result<User, DatabaseError> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("User {username}")))
    }

    // =========================================================================
    // Session queries
    // =========================================================================

    /// Store a session. The row is returned by the insert itself.
    pub async fn create_session(&self, params: &NewSession<'_>) -> Result<Session, DatabaseError> {
        let session = sqlx::query_as::<_, Session>(
            "INSERT INTO sessions (id, username, refresh_token, user_agent, client_ip, is_blocked, expires_at, created_at) VALUES (?, ?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(params.id.to_string())
        .bind(params.username)
        .bind(params.refresh_token)
        .bind(params.user_agent)
        .bind(params.client_ip)
        .bind(params.is_blocked)
        .bind(params.expires_at)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await?;

        Ok(session)
    }

    /// Get a session by ID, whatever its state.
    pub async fn get_session(&self, id: &Uuid) -> Result<Session, DatabaseError> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| DatabaseError::NotFound(format!("Session {id}")))
    }

    /// Block a session. Returns `false` if it does not exist.
    pub async fn block_session(&self, id: &Uuid) -> Result<bool, DatabaseError> {
        let result = sqlx::query("UPDATE sessions SET is_blocked = 1 WHERE id = ?")
            .bind(id.to_string())
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CredentialStore for GatewayDatabase {
    async fn get_user(&self, username: &str) -> Result<User, DatabaseError> {
        Self::get_user(self, username).await
    }

    async fn create_user(&self, params: &NewUser<'_>) -> Result<User, DatabaseError> {
        Self::create_user(self, params).await
    }
}

#[async_trait]
impl SessionStore for GatewayDatabase {
    async fn create_session(&self, params: &NewSession<'_>) -> Result<Session, DatabaseError> {
        Self::create_session(self, params).await
    }

    async fn get_session(&self, id: &Uuid) -> Result<Session, DatabaseError> {
        Self::get_session(self, id).await
    }
}
