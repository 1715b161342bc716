//! Authentication and session lifecycle for the gateway.
//!
//! Login mints an access/refresh token pair and persists a session record
//! keyed by the refresh token's id. Renewal walks the session validity chain
//! before minting a new access token.

pub mod error;
pub mod password;
pub mod service;
pub mod store;
pub mod types;
pub mod validity;


pub use error::AuthError;
pub use service::{AuthService, TokenDurations, build_token_maker};
pub use store::{CredentialStore, SessionStore};
pub use validity::{SessionCheckError, check_session};
