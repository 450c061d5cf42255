//! Fintrack Server - Main entry point.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use fintrack_api::AppState;
use fintrack_auth::{token::DEFAULT_TTL_MILLIS, RepositoryCredentialStore, TokenConfig, TokenService};
use fintrack_storage_sqlite::SqliteBackend;

#[derive(Parser)]
#[command(name = "fintrack-server")]
#[command(about = "Fintrack - personal finance API server")]
#[command(version)]
struct Cli {
    /// Enable development mode (in-memory storage, generated signing key)
    #[arg(long, env = "FINTRACK_DEV_MODE")]
    dev: bool,

    /// Server bind address
    #[arg(long, default_value = "0.0.0.0:8080", env = "FINTRACK_BIND_ADDRESS")]
    bind: String,

    /// Directory holding the SQLite database
    #[arg(long, default_value = "data", env = "FINTRACK_DATA_DIR")]
    data_dir: PathBuf,

    /// Base64-encoded token signing key (at least 32 bytes once decoded)
    #[arg(long, env = "FINTRACK_JWT_SECRET", hide_env_values = true)]
    jwt_secret: Option<String>,

    /// Token lifetime in milliseconds
    #[arg(
        long,
        default_value_t = DEFAULT_TTL_MILLIS,
        env = "FINTRACK_JWT_TTL_MS",
        allow_negative_numbers = true
    )]
    jwt_ttl_ms: i64,
}

impl Cli {
    /// Resolves the token configuration, generating a key in dev mode.
    fn token_config(&self) -> anyhow::Result<TokenConfig> {
        let signing_key = match (&self.jwt_secret, self.dev) {
            (Some(secret), _) => secret.clone(),
            (None, true) => {
                tracing::warn!("No signing key configured, generated an ephemeral one");
                TokenConfig::generate_signing_key()
            },
            (None, false) => bail!("a signing key is required (--jwt-secret or FINTRACK_JWT_SECRET)"),
        };

        Ok(TokenConfig::new(signing_key, self.jwt_ttl_ms))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    tracing::info!("Starting Fintrack server...");
    tracing::info!("Bind address: {}", cli.bind);

    if cli.dev {
        tracing::warn!("Development mode enabled - DO NOT USE IN PRODUCTION");
    }

    let tokens = Arc::new(TokenService::new(&cli.token_config()?).context("invalid token configuration")?);
    tracing::info!(ttl_ms = tokens.ttl_millis(), "Token service ready");

    let backend = if cli.dev {
        SqliteBackend::in_memory().await?
    } else {
        SqliteBackend::open(&cli.data_dir)
            .await
            .with_context(|| format!("failed to open storage in {}", cli.data_dir.display()))?
    };
    match backend.db_path() {
        Some(path) => tracing::info!(path = %path.display(), "Storage opened"),
        None => tracing::info!("Storage is in memory; identities are lost on exit"),
    }
    let store = Arc::new(RepositoryCredentialStore::new(backend));

    let app = fintrack_api::router(AppState::new(tokens, store));

    let listener = tokio::net::TcpListener::bind(&cli.bind)
        .await
        .with_context(|| format!("failed to bind {}", cli.bind))?;

    tracing::info!("Fintrack server started successfully");

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
            }
        })
        .await?;

    tracing::info!("Shutting down...");

    Ok(())
}
