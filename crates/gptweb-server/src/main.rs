//! gptweb gateway server
//!
//! Serves login and token renewal over HTTP, and blocks sessions from the
//! command line.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::{info, warn};
use uuid::Uuid;

use gptweb_core::GatewayConfig;
use gptweb_core::config::{DEFAULT_CONFIG_PATH, load_config};
use gptweb_core::tracing_init::{LogFormat, init_tracing};
use gptweb_server::auth::{AuthService, TokenDurations, build_token_maker};
use gptweb_server::http::{AppState, build_cors_layer, build_router};
use gptweb_server::storage::GatewayDatabase;

#[derive(Parser, Debug)]
#[command(name = "gptweb-server")]
#[command(version, about = "gptweb gateway server - login and access-token renewal")]
struct Args {
    /// Path to the TOML config file. A missing file means defaults.
    #[arg(long, default_value = DEFAULT_CONFIG_PATH, env = "GPTWEB_CONFIG")]
    config: PathBuf,

    /// Address to listen on. Overrides the config file.
    #[arg(long, env = "GPTWEB_SERVER_ADDRESS")]
    addr: Option<String>,

    /// Path to SQLite database file.
    #[arg(long, env = "GPTWEB_DATABASE_PATH")]
    db_path: Option<PathBuf>,

    /// Access token lifetime in seconds.
    #[arg(long, env = "GPTWEB_ACCESS_TOKEN_DURATION_SECS")]
    access_ttl: Option<i64>,

    /// Refresh token lifetime in seconds.
    #[arg(long, env = "GPTWEB_REFRESH_TOKEN_DURATION_SECS")]
    refresh_ttl: Option<i64>,

    /// Output logs as JSON (for structured log aggregation).
    #[arg(long, env = "GPTWEB_LOG_JSON")]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Block a session so its refresh token can no longer renew access.
    BlockSession {
        /// Session id (the refresh token's id).
        id: Uuid,
    },
}

impl Args {
    fn apply_overrides(&self, config: &mut GatewayConfig) {
        if let Some(addr) = &self.addr {
            config.server.address.clone_from(addr);
        }
        if let Some(path) = &self.db_path {
            config.server.database_path = Some(path.clone());
        }
        if let Some(secs) = self.access_ttl {
            config.token.access_token_duration_secs = secs;
        }
        if let Some(secs) = self.refresh_ttl {
            config.token.refresh_token_duration_secs = secs;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing("gptweb_server=info,tower_http=info", LogFormat::from_json_flag(args.log_json))?;

    let mut config = load_config(&args.config)?;
    args.apply_overrides(&mut config);
    config.validate()?;

    let db_path = config.database_path()?;
    info!(path = %db_path.display(), "Opening gateway database");
    let db = GatewayDatabase::open(&db_path).await?;

    if let Some(Command::BlockSession { id }) = args.command {
        if !db.block_session(&id).await? {
            anyhow::bail!("session {id} not found");
        }
        info!(session_id = %id, "Session blocked");
        return Ok(());
    }

    let durations = TokenDurations::from_config(&config.token)?;
    let tokens = build_token_maker(&config.token)?;
    let auth = Arc::new(AuthService::with_database(db, tokens, durations));
    let cors = build_cors_layer(&config.server.cors_origins)?;
    let app = build_router(AppState { auth }, cors);

    let listener = tokio::net::TcpListener::bind(&config.server.address).await?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        addr = %listener.local_addr()?,
        access_ttl_secs = config.token.access_token_duration_secs,
        refresh_ttl_secs = config.token.refresh_token_duration_secs,
        "Starting gptweb-server"
    );

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => {
                warn!(error = %e, "Cannot listen for shutdown signal");
                std::future::pending::<()>().await;
            }
        }
    })
    .await?;

    info!("Gateway stopped");
    Ok(())
}
