//! `gptweb` Core Library
//!
//! Shared functionality for `gptweb` components:
//! - Gateway configuration (file, environment and CLI layers)
//! - `SQLite` pool helpers and the storage error type
//! - Tracing initialisation
//! - Common error types

pub mod config;
pub mod db;
pub mod error;
pub mod tracing_init;

pub use config::GatewayConfig;
pub use error::{Error, Result};
