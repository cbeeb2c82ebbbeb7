//! `WebSocket` handlers for live score and leaderboard updates.
//!
//! - `GET /ws/user/{username}` registers a personal channel. The client
//!   receives a `score_update` each time that user clicks.
//! - `GET /ws/leaderboard` registers an anonymous subscriber. The client
//!   receives the current leaderboard immediately, then a
//!   `leaderboard_update` after every registration or click.
//!
//! Each socket is driven by one task that forwards frames from the
//! connection's outbound queue and watches the socket for close frames and
//! errors. Whichever way the socket ends, the connection is removed from
//! the registry before the task exits. If the registry drops the
//! connection first (a fanout found its queue full), the queue closes and
//! the task closes the socket.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::IntoResponse;
use clickboard_core::Frame;
use clickboard_db::ScoreStore;
use clickboard_types::ConnectionId;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::state::AppState;

/// Upgrade to a personal `score_update` stream for `username`.
///
/// # Route
///
/// `GET /ws/user/{username}`
pub async fn ws_user<S: ScoreStore>(
    ws: WebSocketUpgrade,
    Path(username): Path<String>,
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_personal(socket, username, state))
}

/// Upgrade to the leaderboard subscriber stream.
///
/// # Route
///
/// `GET /ws/leaderboard`
pub async fn ws_leaderboard<S: ScoreStore>(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState<S>>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_subscriber(socket, state))
}

async fn handle_personal<S: ScoreStore>(
    socket: WebSocket,
    username: String,
    state: Arc<AppState<S>>,
) {
    let (id, rx) = state.service.connect_personal(&username).await;
    debug!(%id, username, "Personal WebSocket connected");

    run_connection(socket, id, rx).await;

    state.service.disconnect(id).await;
    debug!(%id, username, "Personal WebSocket closed");
}

async fn handle_subscriber<S: ScoreStore>(mut socket: WebSocket, state: Arc<AppState<S>>) {
    let (id, rx) = match state.service.connect_subscriber().await {
        Ok(pair) => pair,
        Err(e) => {
            warn!(error = %e, "Failed to load leaderboard snapshot, closing WebSocket");
            let _ = socket.send(Message::Close(None)).await;
            return;
        }
    };
    debug!(%id, "Leaderboard WebSocket connected");

    run_connection(socket, id, rx).await;

    state.service.disconnect(id).await;
    debug!(%id, "Leaderboard WebSocket closed");
}

/// Pump queued frames to the socket until either side goes away.
async fn run_connection(mut socket: WebSocket, id: ConnectionId, mut rx: mpsc::Receiver<Frame>) {
    loop {
        tokio::select! {
            // Outbound frame queued by the broadcaster.
            frame = rx.recv() => {
                let Some(frame) = frame else {
                    debug!(%id, "Connection dropped by registry, closing WebSocket");
                    let _ = socket.send(Message::Close(None)).await;
                    return;
                };
                let msg = Message::Text(String::from(&*frame).into());
                if socket.send(msg).await.is_err() {
                    debug!(%id, "WebSocket client disconnected (send failed)");
                    return;
                }
            }
            // Check if the client sent a close frame or disconnected.
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => {
                        debug!(%id, "WebSocket client disconnected");
                        return;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if socket.send(Message::Pong(data)).await.is_err() {
                            debug!(%id, "WebSocket client disconnected (pong failed)");
                            return;
                        }
                    }
                    Some(Err(e)) => {
                        debug!(%id, "WebSocket error: {e}");
                        return;
                    }
                    _ => {
                        // Clients only listen; inbound text and binary are ignored.
                    }
                }
            }
        }
    }
}
