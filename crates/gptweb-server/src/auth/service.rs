//! Auth service: registration, login and access-token renewal.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use tracing::{error, info, instrument, warn};

use gptweb_core::config::TokenConfig;
use gptweb_token::{PasetoMaker, TokenError, TokenKind, TokenMaker, TokenPayload};

use super::error::AuthError;
use super::password::{self, PasswordError};
use super::store::{CredentialStore, SessionStore};
use super::types::{
    ClientInfo, LoginRequest, LoginResponse, RegisterRequest, RenewAccessRequest,
    RenewAccessResponse, UserResponse,
};
use super::validity::check_session;
use crate::storage::{DatabaseError, GatewayDatabase, NewSession, NewUser};

/// Lifetimes of the two token kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenDurations {
    pub access: TimeDelta,
    pub refresh: TimeDelta,
}

impl TokenDurations {
    pub fn from_config(config: &TokenConfig) -> Result<Self, AuthError> {
        let seconds = |secs: i64, name: &str| {
            TimeDelta::try_seconds(secs)
                .ok_or_else(|| AuthError::ConfigInvalid(format!("{name} is out of range")))
        };
        Ok(Self {
            access: seconds(config.access_token_duration_secs, "access_token_duration_secs")?,
            refresh: seconds(config.refresh_token_duration_secs, "refresh_token_duration_secs")?,
        })
    }
}

/// Build the token maker from configuration. A key of the wrong size is
/// `ConfigInvalid`.
pub fn build_token_maker(config: &TokenConfig) -> Result<Arc<dyn TokenMaker>, AuthError> {
    let maker = PasetoMaker::new(config.symmetric_key.as_bytes())
        .map_err(|e| AuthError::ConfigInvalid(format!("token symmetric key: {e}")))?;
    Ok(Arc::new(maker))
}

pub struct AuthService {
    users: Arc<dyn CredentialStore>,
    sessions: Arc<dyn SessionStore>,
    tokens: Arc<dyn TokenMaker>,
    durations: TokenDurations,
}

impl AuthService {
    pub fn new(
        users: Arc<dyn CredentialStore>,
        sessions: Arc<dyn SessionStore>,
        tokens: Arc<dyn TokenMaker>,
        durations: TokenDurations,
    ) -> Self {
        Self {
            users,
            sessions,
            tokens,
            durations,
        }
    }

    /// Service backed by one database for both users and sessions.
    pub fn with_database(
        db: GatewayDatabase,
        tokens: Arc<dyn TokenMaker>,
        durations: TokenDurations,
    ) -> Self {
        let db = Arc::new(db);
        Self::new(Arc::clone(&db) as Arc<dyn CredentialStore>, db, tokens, durations)
    }

    pub const fn durations(&self) -> TokenDurations {
        self.durations
    }

    #[instrument(skip(self, req), fields(username = %req.username))]
    pub async fn register(&self, req: RegisterRequest) -> Result<UserResponse, AuthError> {
        req.validate()?;

        let hashed = password::hash_password(&req.password)
            .map_err(|e| AuthError::Internal(format!("password hashing failed: {e}")))?;

        let user = self
            .users
            .create_user(&NewUser {
                username: &req.username,
                hashed_password: &hashed,
                full_name: &req.full_name,
                email: &req.email,
            })
            .await
            .map_err(|e| match e {
                DatabaseError::Conflict(_) => {
                    warn!("Registration for taken username or email");
                    AuthError::UserAlreadyExists
                }
                other => store_failure("create_user", other),
            })?;

        info!("User registered");
        Ok(user.into())
    }

    /// Check credentials, mint an access/refresh pair and persist the
    /// session backing the refresh token. Nothing is returned unless the
    /// session was stored.
    #[instrument(skip(self, req, client), fields(username = %req.username, client_ip = %client.client_ip))]
    pub async fn login(
        &self,
        req: LoginRequest,
        client: ClientInfo,
    ) -> Result<LoginResponse, AuthError> {
        req.validate()?;

        let user = self.users.get_user(&req.username).await.map_err(|e| {
            if e.is_not_found() {
                warn!("Login for unknown user");
                AuthError::UserNotFound
            } else {
                store_failure("get_user", e)
            }
        })?;

        password::check_password(&req.password, &user.hashed_password).map_err(|e| match e {
            PasswordError::Mismatch => {
                warn!("Failed login attempt");
                AuthError::InvalidCredentials
            }
            PasswordError::Hash(e) => {
                error!(error = %e, "Stored password hash is unusable");
                AuthError::Internal("password verification failed".into())
            }
        })?;

        let (access_token, access_payload) = self
            .tokens
            .create_token(&user.username, self.durations.access)
            .map_err(issue_failure)?;
        let (refresh_token, refresh_payload) = self
            .tokens
            .create_refresh_token(&user.username, self.durations.refresh)
            .map_err(issue_failure)?;

        let session = self
            .sessions
            .create_session(&NewSession {
                id: refresh_payload.id,
                username: &user.username,
                refresh_token: &refresh_token,
                user_agent: &client.user_agent,
                client_ip: &client.client_ip,
                is_blocked: false,
                expires_at: refresh_payload.expired_at,
            })
            .await
            .map_err(|e| store_failure("create_session", e))?;

        info!(session_id = %session.id, "User logged in");

        Ok(LoginResponse {
            session_id: refresh_payload.id,
            access_token,
            access_token_expires_at: access_payload.expired_at,
            refresh_token,
            refresh_token_expires_at: refresh_payload.expired_at,
            user: user.into(),
        })
    }

    /// Mint a new access token from a refresh token. The refresh token and
    /// its session are left untouched.
    #[instrument(skip_all)]
    pub async fn renew_access(
        &self,
        req: RenewAccessRequest,
    ) -> Result<RenewAccessResponse, AuthError> {
        let payload = self
            .tokens
            .verify_token(&req.refresh_token)
            .and_then(|payload| payload.expect_kind(TokenKind::Refresh).map(|()| payload))
            .map_err(|e| {
                warn!(kind = e.kind(), "Renewal rejected: invalid refresh token");
                AuthError::InvalidToken(e)
            })?;

        let session = self.sessions.get_session(&payload.id).await.map_err(|e| {
            if e.is_not_found() {
                warn!(session_id = %payload.id, "Renewal rejected: session not found");
                AuthError::SessionNotFound
            } else {
                store_failure("get_session", e)
            }
        })?;

        let username = check_session(&payload, &req.refresh_token, &session, Utc::now())
            .map_err(|e| {
                let err = AuthError::from(e);
                warn!(session_id = %session.id, kind = err.kind(), "Renewal rejected");
                err
            })?;

        let (access_token, access_payload) = self
            .tokens
            .create_token(username, self.durations.access)
            .map_err(issue_failure)?;

        info!(session_id = %session.id, username, "Access token renewed");

        Ok(RenewAccessResponse {
            access_token,
            access_token_expires_at: access_payload.expired_at,
        })
    }

    /// Verify an access token presented by a client. Refresh tokens are
    /// rejected here.
    pub fn verify_access_token(&self, token: &str) -> Result<TokenPayload, AuthError> {
        self.tokens
            .verify_token(token)
            .and_then(|payload| payload.expect_kind(TokenKind::Access).map(|()| payload))
            .map_err(|e| {
                warn!(kind = e.kind(), "Access token rejected");
                AuthError::InvalidToken(e)
            })
    }
}

fn store_failure(op: &'static str, e: DatabaseError) -> AuthError {
    error!(op, error = %e, "Store operation failed");
    AuthError::from(e)
}

fn issue_failure(e: TokenError) -> AuthError {
    error!(kind = e.kind(), error = %e, "Token issuance failed");
    AuthError::Internal(format!("token issuance failed: {e}"))
}
