//! Clickboard server binary.
//!
//! Wires the score store, the leaderboard service and the HTTP/`WebSocket`
//! API together and serves until `Ctrl-C`.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `clickboard.yaml` (or `CLICKBOARD_CONFIG`)
//! 3. Open the configured score store
//! 4. Build application state and serve

mod error;

use std::path::PathBuf;
use std::sync::Arc;

use clickboard_api::{AppState, ServerConfig};
use clickboard_core::ClickboardConfig;
use clickboard_core::config::StoreBackend;
use clickboard_db::{JsonFileStore, MemoryStore, ScoreStore};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Default configuration file, relative to the working directory.
const DEFAULT_CONFIG_PATH: &str = "clickboard.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, store initialization, or the server
/// fails.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Initialize structured logging.
    init_tracing();
    info!("clickboard-server starting");

    // 2. Load configuration.
    let config = load_config()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        backend = ?config.store.backend,
        store_path = %config.store.path.display(),
        leaderboard_size = config.leaderboard.size,
        "Configuration loaded"
    );

    // 3. Open the score store and serve.
    match config.store.backend {
        StoreBackend::JsonFile => {
            let store = JsonFileStore::open(&config.store.path).await?;
            serve(store, config).await
        }
        StoreBackend::Memory => {
            info!("Using in-memory score store; scores are lost on restart");
            serve(MemoryStore::new(), config).await
        }
    }
}

/// Build application state over `store` and run the HTTP server.
async fn serve<S: ScoreStore>(store: S, config: ClickboardConfig) -> Result<(), AppError> {
    let server_config = ServerConfig {
        host: config.server.host,
        port: config.server.port,
    };
    let state = Arc::new(AppState::new(
        store,
        config.leaderboard,
        config.connections,
        config.server.cors_origins,
    ));

    clickboard_api::start_server(&server_config, state).await?;

    info!("clickboard-server shutdown complete");
    Ok(())
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` controls filtering (default `info`). `LOG_FORMAT=json`
/// switches to line-delimited JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load configuration from `CLICKBOARD_CONFIG` or `clickboard.yaml`.
///
/// A missing file means defaults; environment overrides apply either way.
fn load_config() -> Result<ClickboardConfig, AppError> {
    let path = std::env::var("CLICKBOARD_CONFIG")
        .map_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH), PathBuf::from);

    if path.exists() {
        Ok(ClickboardConfig::from_file(&path)?)
    } else {
        info!(path = %path.display(), "Config file not found, using defaults");
        let mut config = ClickboardConfig::default();
        config.apply_env_overrides()?;
        Ok(config)
    }
}
