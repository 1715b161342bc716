//! Request and response bodies for the auth flows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::AuthError;
use crate::storage::User;

/// Minimum accepted password length, in characters.
pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
    pub full_name: String,
    pub email: String,
}

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        validate_username(&self.username)?;
        validate_password(&self.password)?;
        if self.full_name.trim().is_empty() {
            return Err(AuthError::Validation("full_name is required".into()));
        }
        validate_email(&self.email)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl LoginRequest {
    pub fn validate(&self) -> Result<(), AuthError> {
        validate_username(&self.username)?;
        validate_password(&self.password)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RenewAccessRequest {
    pub refresh_token: String,
}

/// Public view of a user; never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserResponse {
    pub username: String,
    pub full_name: String,
    pub email: String,
    pub password_changed_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            password_changed_at: user.password_changed_at,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub session_id: Uuid,
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token: String,
    pub refresh_token_expires_at: DateTime<Utc>,
    pub user: UserResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenewAccessResponse {
    pub access_token: String,
    pub access_token_expires_at: DateTime<Utc>,
}

/// Where a login came from; stored on the session record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientInfo {
    pub user_agent: String,
    pub client_ip: String,
}

fn validate_username(username: &str) -> Result<(), AuthError> {
    if username.is_empty() || !username.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(AuthError::Validation(
            "username must be non-empty and alphanumeric".into(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

fn validate_email(email: &str) -> Result<(), AuthError> {
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty() && !domain.contains('@'));
    if !valid {
        return Err(AuthError::Validation("email is not valid".into()));
    }
    Ok(())
}
