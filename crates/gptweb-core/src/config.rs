//! Configuration resolution for the gateway.
//!
//! Resolution order (later layers win):
//! 1. Built-in defaults
//! 2. TOML config file (`config/gptweb.toml` unless overridden)
//! 3. Environment variables (`GPTWEB_*`)
//! 4. CLI arguments, applied by the binary
//!
//! The resolved configuration is immutable once the server starts.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Default config file location, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "config/gptweb.toml";

/// Default access token lifetime: 15 minutes.
pub const DEFAULT_ACCESS_TOKEN_SECS: i64 = 15 * 60;

/// Default refresh token lifetime: 7 days.
pub const DEFAULT_REFRESH_TOKEN_SECS: i64 = 7 * 24 * 60 * 60;

/// Complete gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GatewayConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub token: TokenConfig,
}

/// Listener and storage settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    pub address: String,
    /// `SQLite` database file. `None` selects [`default_database_path`].
    pub database_path: Option<PathBuf>,
    /// Browser origins allowed by CORS. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1:8080".to_string(),
            database_path: None,
            cors_origins: Vec::new(),
        }
    }
}

/// Token issuance settings.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenConfig {
    /// Symmetric key for token encryption. Its length is checked when the
    /// token maker is constructed.
    pub symmetric_key: String,
    pub access_token_duration_secs: i64,
    pub refresh_token_duration_secs: i64,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            symmetric_key: String::new(),
            access_token_duration_secs: DEFAULT_ACCESS_TOKEN_SECS,
            refresh_token_duration_secs: DEFAULT_REFRESH_TOKEN_SECS,
        }
    }
}

// The key must never reach the logs.
impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("symmetric_key", &"<redacted>")
            .field("access_token_duration_secs", &self.access_token_duration_secs)
            .field("refresh_token_duration_secs", &self.refresh_token_duration_secs)
            .finish()
    }
}

impl GatewayConfig {
    /// Check invariants that do not depend on other components.
    pub fn validate(&self) -> Result<()> {
        if self.token.access_token_duration_secs <= 0 {
            return Err(Error::Config(
                "access_token_duration_secs must be positive".to_string(),
            ));
        }
        if self.token.refresh_token_duration_secs <= 0 {
            return Err(Error::Config(
                "refresh_token_duration_secs must be positive".to_string(),
            ));
        }
        if self.server.address.trim().is_empty() {
            return Err(Error::Config("server address must not be empty".to_string()));
        }
        Ok(())
    }

    /// The configured database path, or the platform default.
    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.server.database_path {
            Some(path) => Ok(path.clone()),
            None => default_database_path()
                .ok_or_else(|| Error::Config("Cannot determine home directory".to_string())),
        }
    }
}

/// Load configuration: defaults, then `path` (if it exists), then the
/// process environment.
pub fn load_config(path: &Path) -> Result<GatewayConfig> {
    let mut config = if path.exists() {
        load_config_file(path)?
    } else {
        GatewayConfig::default()
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    Ok(config)
}

/// Default database location: `gptweb/gateway.db` under the platform data
/// directory (`$XDG_DATA_HOME` or `~/.local/share` on Linux).
pub fn default_database_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("gptweb").join("gateway.db"))
}

fn load_config_file(path: &Path) -> Result<GatewayConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::Config(format!("Failed to read config file {}: {}", path.display(), e))
    })?;
    toml::from_str(&content).map_err(|e| {
        Error::Config(format!("Failed to parse config file {}: {}", path.display(), e))
    })
}

/// Apply `GPTWEB_*` overrides read through `lookup`.
pub fn apply_env_overrides<F>(config: &mut GatewayConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = lookup("GPTWEB_SERVER_ADDRESS") {
        config.server.address = val;
    }
    if let Some(val) = lookup("GPTWEB_DATABASE_PATH") {
        config.server.database_path = Some(PathBuf::from(val));
    }
    if let Some(val) = lookup("GPTWEB_CORS_ORIGINS") {
        config.server.cors_origins = val
            .split(',')
            .map(str::trim)
            .filter(|o| !o.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Some(val) = lookup("GPTWEB_TOKEN_SYMMETRIC_KEY") {
        config.token.symmetric_key = val;
    }
    if let Some(val) = lookup("GPTWEB_ACCESS_TOKEN_DURATION_SECS") {
        config.token.access_token_duration_secs = parse_secs("GPTWEB_ACCESS_TOKEN_DURATION_SECS", &val)?;
    }
    if let Some(val) = lookup("GPTWEB_REFRESH_TOKEN_DURATION_SECS") {
        config.token.refresh_token_duration_secs =
            parse_secs("GPTWEB_REFRESH_TOKEN_DURATION_SECS", &val)?;
    }
    Ok(())
}

fn parse_secs(key: &str, val: &str) -> Result<i64> {
    val.trim()
        .parse()
        .map_err(|_| Error::Config(format!("{key} must be an integer number of seconds, got {val:?}")))
}
