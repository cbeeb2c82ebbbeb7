//! HTTP and `WebSocket` API for the Clickboard leaderboard service.
//!
//! This crate provides an Axum server that exposes:
//!
//! - **REST endpoints** for registering, clicking, and reading scores
//! - **`WebSocket` endpoints** for live updates: `/ws/user/{username}`
//!   (personal `score_update` stream) and `/ws/leaderboard` (snapshot on
//!   connect, then every `leaderboard_update`)
//!
//! # Architecture
//!
//! Handlers are thin: they decode the request, call the shared
//! [`LeaderboardService`], and map [`ServiceError`]s to HTTP status codes.
//! Each `WebSocket` runs in its own task that drains the connection's
//! outbound queue onto the socket and unregisters the connection when
//! the socket closes.
//!
//! [`LeaderboardService`]: clickboard_core::LeaderboardService
//! [`ServiceError`]: clickboard_core::ServiceError

pub mod error;
pub mod handlers;
pub mod router;
pub mod server;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use error::ApiError;
pub use router::build_router;
pub use server::{ServerConfig, ServerError, start_server};
pub use state::AppState;
