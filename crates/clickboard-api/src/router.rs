//! Axum router construction for the Clickboard API.
//!
//! Assembles all routes (REST + `WebSocket`) into a single [`Router`]
//! with CORS and request tracing middleware.

use std::sync::Arc;

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use clickboard_db::ScoreStore;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::handlers;
use crate::state::AppState;
use crate::ws;

/// Build the complete Axum router.
///
/// The router includes:
/// - `POST /register` -- register a username
/// - `POST /click` -- apply a click
/// - `GET /leaderboard` -- top of the leaderboard
/// - `GET /user/{username}` -- one user's standing
/// - `GET /health` -- liveness and counts
/// - `GET /ws/user/{username}` -- personal `WebSocket`
/// - `GET /ws/leaderboard` -- leaderboard `WebSocket`
///
/// CORS allows the origins listed in [`AppState::cors_origins`], or any
/// origin when the list is empty.
pub fn build_router<S: ScoreStore>(state: Arc<AppState<S>>) -> Router {
    let cors = cors_layer(&state.cors_origins);

    Router::new()
        // REST API
        .route("/register", post(handlers::register::<S>))
        .route("/click", post(handlers::click::<S>))
        .route("/leaderboard", get(handlers::leaderboard::<S>))
        .route("/user/{username}", get(handlers::get_user::<S>))
        .route("/health", get(handlers::health::<S>))
        // WebSocket
        .route("/ws/user/{username}", get(ws::ws_user::<S>))
        .route("/ws/leaderboard", get(ws::ws_leaderboard::<S>))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.is_empty() {
        return base.allow_origin(Any);
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(allowed))
}
