//! REST API endpoint handlers.
//!
//! All handlers go through the shared [`LeaderboardService`] on
//! [`AppState`]. Score-changing handlers trigger the live fanout before
//! they respond.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/register` | Register a username |
//! | `POST` | `/click` | Apply a click (`is_drag` = 10 points, else 1) |
//! | `GET` | `/leaderboard` | Top of the leaderboard |
//! | `GET` | `/user/{username}` | One user's score and position |
//! | `GET` | `/health` | Liveness plus store and connection counts |
//!
//! [`LeaderboardService`]: clickboard_core::LeaderboardService

use std::sync::Arc;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use clickboard_db::ScoreStore;

use crate::error::ApiError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request bodies
// ---------------------------------------------------------------------------

/// Request body for `POST /register`.
#[derive(Debug, serde::Deserialize)]
pub struct RegisterRequest {
    /// Name to register.
    pub username: String,
    /// Accepted for compatibility with older clients and ignored; new users
    /// always start at zero.
    #[serde(default)]
    pub score: Option<i64>,
}

/// Request body for `POST /click`.
#[derive(Debug, serde::Deserialize)]
pub struct ClickRequest {
    /// User receiving the points.
    pub username: String,
    /// Whether the click was a drag gesture.
    #[serde(default)]
    pub is_drag: bool,
}

// ---------------------------------------------------------------------------
// POST /register
// ---------------------------------------------------------------------------

/// Register a new user and broadcast the refreshed leaderboard.
///
/// Responds `400` if the name is taken or invalid, or the body is malformed.
pub async fn register<S: ScoreStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    state.service.register(&body.username).await?;
    Ok(Json(serde_json::json!({
        "message": "User registered successfully",
    })))
}

// ---------------------------------------------------------------------------
// POST /click
// ---------------------------------------------------------------------------

/// Apply one click and return the new score, position and leaderboard.
///
/// Responds `404` if the user is not registered.
pub async fn click<S: ScoreStore>(
    State(state): State<Arc<AppState<S>>>,
    body: Result<Json<ClickRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body?;
    let outcome = state.service.click(&body.username, body.is_drag).await?;
    Ok(Json(outcome))
}

// ---------------------------------------------------------------------------
// GET /leaderboard
// ---------------------------------------------------------------------------

/// Return the top of the leaderboard as a JSON array.
pub async fn leaderboard<S: ScoreStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.leaderboard().await?))
}

// ---------------------------------------------------------------------------
// GET /user/{username}
// ---------------------------------------------------------------------------

/// Return one user's score and position.
pub async fn get_user<S: ScoreStore>(
    State(state): State<Arc<AppState<S>>>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.user(&username).await?))
}

// ---------------------------------------------------------------------------
// GET /health
// ---------------------------------------------------------------------------

/// Liveness probe with user and connection counts.
pub async fn health<S: ScoreStore>(
    State(state): State<Arc<AppState<S>>>,
) -> Result<impl IntoResponse, ApiError> {
    let users = state.service.user_count().await?;
    let counts = state.service.connection_counts().await;
    Ok(Json(serde_json::json!({
        "status": "ok",
        "users": users,
        "personal_connections": counts.personal,
        "leaderboard_subscribers": counts.subscribers,
    })))
}
