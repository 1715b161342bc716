//! gptweb gateway server library
//!
//! - SQLite storage for users and refresh-token sessions
//! - Auth service: registration, login and access-token renewal
//! - HTTP routes and the bearer-token guard

pub mod auth;
pub mod http;
pub mod storage;
