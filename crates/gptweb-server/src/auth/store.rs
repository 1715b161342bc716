//! Storage seams used by the auth service.

use async_trait::async_trait;
use uuid::Uuid;

use crate::storage::{DatabaseError, NewSession, NewUser, Session, User};

/// Lookup and creation of user credentials.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fetch a user, or `DatabaseError::NotFound`.
    async fn get_user(&self, username: &str) -> Result<User, DatabaseError>;

    /// Insert a user. A taken username or email is `DatabaseError::Conflict`.
    async fn create_user(&self, params: &NewUser<'_>) -> Result<User, DatabaseError>;
}

/// Persistence of session records.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a session atomically and return the stored record.
    async fn create_session(&self, params: &NewSession<'_>) -> Result<Session, DatabaseError>;

    /// Fetch a session by id regardless of its state, or `DatabaseError::NotFound`.
    async fn get_session(&self, id: &Uuid) -> Result<Session, DatabaseError>;
}
