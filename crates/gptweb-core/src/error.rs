//! Error types for `gptweb` core library.

use thiserror::Error;

/// Result type alias using `gptweb` Error.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for `gptweb` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error (unreadable file, bad value, failed invariant)
    #[error("Configuration error: {0}")]
    Config(String),
}
