//! End-to-end tests for the `WebSocket` endpoints.
//!
//! Each test starts the real router on an ephemeral port and connects with
//! `tokio-tungstenite`, then drives score changes through the shared
//! service and checks what arrives on the sockets.

#![allow(clippy::unwrap_used)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clickboard_api::router::build_router;
use clickboard_api::state::AppState;
use clickboard_db::MemoryStore;
use futures_util::StreamExt;
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

async fn start_test_server() -> (Arc<AppState<MemoryStore>>, SocketAddr) {
    let state = Arc::new(AppState::with_defaults(MemoryStore::new()));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = build_router(Arc::clone(&state));
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (state, addr)
}

async fn connect(addr: SocketAddr, path: &str) -> Client {
    let (client, _) = tokio_tungstenite::connect_async(format!("ws://{addr}{path}"))
        .await
        .unwrap();
    client
}

/// Next JSON text frame, skipping control frames.
async fn next_json(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(RECV_TIMEOUT, client.next())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Assert nothing else arrives for a short while.
async fn assert_silent(client: &mut Client) {
    let result = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
    assert!(result.is_err(), "unexpected frame: {result:?}");
}

/// Wait until the registry reports the given counts.
async fn wait_for_counts(state: &AppState<MemoryStore>, personal: usize, subscribers: usize) {
    tokio::time::timeout(RECV_TIMEOUT, async {
        loop {
            let counts = state.service.connection_counts().await;
            if counts.personal == personal && counts.subscribers == subscribers {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn test_leaderboard_socket_gets_snapshot_on_connect() {
    let (state, addr) = start_test_server().await;
    state.service.register("alice").await.unwrap();
    state.service.click("alice", true).await.unwrap();

    let mut client = connect(addr, "/ws/leaderboard").await;

    let json = next_json(&mut client).await;
    assert_eq!(json["type"], "leaderboard_update");
    assert_eq!(
        json["data"],
        serde_json::json!([{"username": "alice", "score": 10, "position": 1}])
    );
}

#[tokio::test]
async fn test_click_pushes_personal_and_leaderboard_updates() {
    let (state, addr) = start_test_server().await;
    state.service.register("alice").await.unwrap();

    let mut phone = connect(addr, "/ws/user/alice").await;
    let mut laptop = connect(addr, "/ws/user/alice").await;
    let mut board = connect(addr, "/ws/leaderboard").await;
    let _snapshot = next_json(&mut board).await;
    wait_for_counts(&state, 2, 1).await;

    state.service.click("alice", false).await.unwrap();

    let expected = serde_json::json!({
        "type": "score_update",
        "data": {"new_score": 1, "position": 1}
    });
    assert_eq!(next_json(&mut phone).await, expected);
    assert_eq!(next_json(&mut laptop).await, expected);

    let update = next_json(&mut board).await;
    assert_eq!(update["type"], "leaderboard_update");
    assert_eq!(update["data"][0]["score"], 1);

    assert_silent(&mut phone).await;
    assert_silent(&mut board).await;
}

#[tokio::test]
async fn test_registration_refreshes_leaderboard_socket() {
    let (state, addr) = start_test_server().await;

    let mut board = connect(addr, "/ws/leaderboard").await;
    let snapshot = next_json(&mut board).await;
    assert_eq!(snapshot["data"], serde_json::json!([]));

    state.service.register("bob").await.unwrap();

    let update = next_json(&mut board).await;
    assert_eq!(
        update["data"],
        serde_json::json!([{"username": "bob", "score": 0, "position": 1}])
    );
}

#[tokio::test]
async fn test_other_users_do_not_see_personal_updates() {
    let (state, addr) = start_test_server().await;
    state.service.register("alice").await.unwrap();
    state.service.register("bob").await.unwrap();

    let mut bob = connect(addr, "/ws/user/bob").await;
    wait_for_counts(&state, 1, 0).await;

    state.service.click("alice", true).await.unwrap();

    assert_silent(&mut bob).await;
}

#[tokio::test]
async fn test_closed_socket_is_unregistered() {
    let (state, addr) = start_test_server().await;
    state.service.register("alice").await.unwrap();

    let mut personal = connect(addr, "/ws/user/alice").await;
    let mut board = connect(addr, "/ws/leaderboard").await;
    let _snapshot = next_json(&mut board).await;
    wait_for_counts(&state, 1, 1).await;

    personal.close(None).await.unwrap();
    board.close(None).await.unwrap();
    wait_for_counts(&state, 0, 0).await;

    // Nothing left to deliver to; the click still succeeds.
    let outcome = state.service.click("alice", false).await.unwrap();
    assert_eq!(outcome.new_score, 1);
}
