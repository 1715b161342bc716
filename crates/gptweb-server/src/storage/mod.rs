//! SQLite storage for the gptweb gateway.
//!
//! Provides persistence for users and refresh-token sessions.

mod db;
mod models;
mod queries;


pub use db::GatewayDatabase;
pub use gptweb_core::db::DatabaseError;
pub use models::*;
