//! Shared application state for the API server.
//!
//! [`AppState`] wraps the [`LeaderboardService`], which owns the score
//! store and the connection registry, plus the CORS allow-list the router
//! is built with.

use clickboard_core::LeaderboardService;
use clickboard_core::config::{ConnectionsConfig, LeaderboardConfig};
use clickboard_db::ScoreStore;

/// Shared state for the Axum application.
///
/// Wrapped in [`Arc`](std::sync::Arc) and injected via Axum's `State`
/// extractor.
#[derive(Debug)]
pub struct AppState<S> {
    /// Register/click orchestration and connection tracking.
    pub service: LeaderboardService<S>,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

impl<S: ScoreStore> AppState<S> {
    /// Create application state over `store`.
    pub fn new(
        store: S,
        leaderboard: LeaderboardConfig,
        connections: ConnectionsConfig,
        cors_origins: Vec<String>,
    ) -> Self {
        Self {
            service: LeaderboardService::new(store, leaderboard, connections),
            cors_origins,
        }
    }

    /// Create application state with default leaderboard and connection
    /// settings and a permissive CORS policy.
    pub fn with_defaults(store: S) -> Self {
        Self::new(
            store,
            LeaderboardConfig::default(),
            ConnectionsConfig::default(),
            Vec::new(),
        )
    }
}
