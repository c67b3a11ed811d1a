// ABOUTME: Entry point for the ratekeeper binary.
// ABOUTME: Loads .env and CLI overrides, initializes tracing, opens the store, seeds the admin, and serves HTTP.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use ratekeeper_server::{AppState, ServerConfig, create_router, seed_admin};
use ratekeeper_store::Database;

/// Backend for the currency-rate and update-notice app.
#[derive(Debug, Parser)]
#[command(name = "ratekeeper", version, about)]
struct Cli {
    /// Listen port (overrides PORT).
    #[arg(long)]
    port: Option<u16>,

    /// SQLite database file (overrides DATABASE_PATH).
    #[arg(long)]
    database: Option<PathBuf>,

    /// Static asset directory served at / (overrides STATIC_DIR).
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

impl Cli {
    fn apply(self, config: &mut ServerConfig) {
        if let Some(port) = self.port {
            config.bind.set_port(port);
        }
        if let Some(database) = self.database {
            config.database_path = database;
        }
        if let Some(static_dir) = self.static_dir {
            config.static_dir = static_dir;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loaded before the subscriber so RUST_LOG may come from .env.
    let env_file = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                tracing_subscriber::EnvFilter::new(
                    "ratekeeper=debug,ratekeeper_server=debug,ratekeeper_store=debug,tower_http=debug",
                )
            }),
        )
        .init();

    if let Some(err) = env_file_error(env_file) {
        tracing::warn!("ignoring unreadable .env file: {}", err);
    }

    let cli = Cli::parse();
    run(cli)
        .await
        .inspect_err(|err| tracing::error!("ratekeeper failed: {:#}", err))
}

/// A missing .env file is normal; any other failure is worth reporting.
fn env_file_error<T>(result: Result<T, dotenvy::Error>) -> Option<dotenvy::Error> {
    match result {
        Ok(_) => None,
        Err(dotenvy::Error::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => Some(err),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = ServerConfig::from_env().context("invalid configuration")?;
    cli.apply(&mut config);
    tracing::debug!("loaded configuration: {:?}", config);
    serve(config).await
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    let db = Database::open(&config.database_path).with_context(|| {
        format!("failed to open database at {}", config.database_path.display())
    })?;
    tracing::info!("database opened at {}", config.database_path.display());

    let state = Arc::new(AppState::new(&db, config));

    seed_admin(
        &state.users,
        &state.config.admin_username,
        &state.config.admin_password,
    )
    .context("failed to seed admin user")?;
    if state.config.uses_default_admin_password() {
        tracing::warn!("admin account uses the built-in default password; set ADMIN_PASSWORD");
    }
    if !state.config.protect_writes {
        tracing::warn!("record mutation routes are unauthenticated; set PROTECT_WRITES=true to guard them");
    }
    if state.config.token_ttl.is_none() {
        tracing::warn!("tokens are issued without expiry (TOKEN_TTL_SECS=0)");
    }

    let bind = state.config.bind;
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {}", bind))?;
    tracing::info!("server is running on {}", bind);

    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    tracing::info!("ratekeeper shut down");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
