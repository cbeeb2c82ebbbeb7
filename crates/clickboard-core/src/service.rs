//! Register / click orchestration.
//!
//! [`LeaderboardService`] is the only component that mutates the store.
//! After a successful click on user `U` with new score `S` it runs, in
//! order:
//!
//! 1. `position = position_of(U)`
//! 2. `leaderboard = top_n(size)`
//! 3. `send_personal(U, score_update {S, position})`
//! 4. `broadcast_leaderboard(leaderboard_update {leaderboard})`
//!
//! Registration has no personal update and runs only step 4. Every view is
//! taken after the triggering mutation has completed, so a broadcast never
//! shows a state older than the change that caused it.

use std::sync::Arc;

use clickboard_db::ScoreStore;
use clickboard_types::{
    ClickOutcome, ConnectionId, LeaderboardEntry, ScoreUpdate, ServerMessage, UserStanding,
};
use tokio::sync::mpsc;
use tracing::{error, info};

use crate::broadcaster::Broadcaster;
use crate::config::{ConnectionsConfig, LeaderboardConfig};
use crate::error::ServiceError;
use crate::ranker::Ranker;
use crate::registry::{Connection, ConnectionRegistry, Frame, RegistryCounts};

/// Points for a plain click.
pub const TAP_POINTS: u64 = 1;

/// Points for a drag gesture.
pub const DRAG_POINTS: u64 = 10;

/// Points awarded for one click event.
pub const fn click_points(is_drag: bool) -> u64 {
    if is_drag { DRAG_POINTS } else { TAP_POINTS }
}

/// Owns the store, the ranker, and the connection registry, and drives
/// the update flow between them.
#[derive(Debug)]
pub struct LeaderboardService<S> {
    store: Arc<S>,
    ranker: Ranker<S>,
    registry: Arc<ConnectionRegistry>,
    broadcaster: Broadcaster,
    leaderboard: LeaderboardConfig,
    connections: ConnectionsConfig,
}

impl<S: ScoreStore> LeaderboardService<S> {
    /// Create a service over `store` with an empty connection registry.
    pub fn new(store: S, leaderboard: LeaderboardConfig, connections: ConnectionsConfig) -> Self {
        let store = Arc::new(store);
        let registry = Arc::new(ConnectionRegistry::new());
        Self {
            ranker: Ranker::new(Arc::clone(&store)),
            broadcaster: Broadcaster::new(Arc::clone(&registry)),
            store,
            registry,
            leaderboard,
            connections,
        }
    }

    /// The connection registry.
    pub fn registry(&self) -> &ConnectionRegistry {
        &self.registry
    }

    /// The ranker reading from this service's store.
    pub const fn ranker(&self) -> &Ranker<S> {
        &self.ranker
    }

    // -----------------------------------------------------------------------
    // Actions
    // -----------------------------------------------------------------------

    /// Register a new user and broadcast the refreshed leaderboard.
    ///
    /// # Errors
    ///
    /// [`ServiceError::InvalidUsername`] if the name fails validation,
    /// [`ServiceError::AlreadyExists`] if it is taken, or
    /// [`ServiceError::Persistence`] if the store could not save it.
    pub async fn register(&self, username: &str) -> Result<(), ServiceError> {
        self.validate_username(username)?;
        self.store
            .register(username)
            .await
            .map_err(|e| log_store_error("register", username, e.into()))?;
        info!(username, "User registered");

        self.publish_leaderboard().await?;
        Ok(())
    }

    /// Apply one click to `username` and fan out the results.
    ///
    /// A drag is worth [`DRAG_POINTS`], anything else [`TAP_POINTS`].
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] if the user is not registered (nothing is
    /// changed or sent), or [`ServiceError::Persistence`] on store failure.
    pub async fn click(&self, username: &str, is_drag: bool) -> Result<ClickOutcome, ServiceError> {
        let new_score = self
            .store
            .increment(username, click_points(is_drag))
            .await
            .map_err(|e| log_store_error("click", username, e.into()))?;

        let position = self.ranker.position_of(username).await?;
        let leaderboard = self.ranker.top_n(self.leaderboard.size).await?;

        self.broadcaster
            .send_personal(
                username,
                &ServerMessage::ScoreUpdate(ScoreUpdate {
                    new_score,
                    position,
                }),
            )
            .await;
        self.broadcaster
            .broadcast_leaderboard(&ServerMessage::LeaderboardUpdate(leaderboard.clone()))
            .await;

        Ok(ClickOutcome {
            new_score,
            position,
            leaderboard,
        })
    }

    /// The top of the leaderboard.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Persistence`] on store read failure.
    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        Ok(self.ranker.top_n(self.leaderboard.size).await?)
    }

    /// Score and rank of a single user.
    ///
    /// # Errors
    ///
    /// [`ServiceError::NotFound`] if the user is not registered.
    pub async fn user(&self, username: &str) -> Result<UserStanding, ServiceError> {
        let score = self.store.get(username).await?;
        let position = self.ranker.position_of(username).await?;
        Ok(UserStanding {
            username: username.to_owned(),
            score,
            position,
        })
    }

    /// Number of registered users.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Persistence`] on store read failure.
    pub async fn user_count(&self) -> Result<usize, ServiceError> {
        Ok(self.store.list_all().await?.len())
    }

    // -----------------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------------

    /// Open a personal channel for `username`.
    ///
    /// The username does not have to be registered yet; updates start
    /// flowing once it is. Returns the connection id and the queue the
    /// socket task drains.
    pub async fn connect_personal(&self, username: &str) -> (ConnectionId, mpsc::Receiver<Frame>) {
        let (connection, rx) = Connection::channel(self.connections.outbound_buffer);
        let id = connection.id();
        self.registry.add_personal(username, connection).await;
        (id, rx)
    }

    /// Open a leaderboard subscription.
    ///
    /// The current snapshot is already queued on the returned receiver.
    /// The connection is registered before the snapshot is taken, so no
    /// update that happens after the snapshot can be missed.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Persistence`] if the snapshot cannot be read; the
    /// connection is unregistered again in that case.
    pub async fn connect_subscriber(
        &self,
    ) -> Result<(ConnectionId, mpsc::Receiver<Frame>), ServiceError> {
        let (connection, rx) = Connection::channel(self.connections.outbound_buffer);
        let id = connection.id();
        self.registry.add_subscriber(connection.clone()).await;

        let snapshot = match self.snapshot_message().await {
            Ok(message) => message,
            Err(e) => {
                self.registry.remove(id).await;
                return Err(e);
            }
        };
        match snapshot.to_json() {
            Ok(json) => {
                let frame: Frame = Arc::from(json);
                if connection.try_deliver(&frame).is_err() {
                    self.registry.remove(id).await;
                }
            }
            Err(e) => {
                error!(error = %e, "Failed to serialize leaderboard snapshot");
            }
        }
        Ok((id, rx))
    }

    /// Forget connection `id`. Idempotent.
    pub async fn disconnect(&self, id: ConnectionId) {
        self.registry.remove(id).await;
    }

    /// Current registry sizes.
    pub async fn connection_counts(&self) -> RegistryCounts {
        self.registry.counts().await
    }

    /// The `leaderboard_update` message describing the current top N.
    ///
    /// # Errors
    ///
    /// [`ServiceError::Persistence`] on store read failure.
    pub async fn snapshot_message(&self) -> Result<ServerMessage, ServiceError> {
        Ok(ServerMessage::LeaderboardUpdate(self.leaderboard().await?))
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn publish_leaderboard(&self) -> Result<(), ServiceError> {
        let message = self.snapshot_message().await?;
        self.broadcaster.broadcast_leaderboard(&message).await;
        Ok(())
    }

    fn validate_username(&self, username: &str) -> Result<(), ServiceError> {
        if username.trim().is_empty() {
            return Err(ServiceError::InvalidUsername(String::from(
                "username must not be empty",
            )));
        }
        if username.len() > self.leaderboard.max_username_len {
            return Err(ServiceError::InvalidUsername(format!(
                "username must be at most {} bytes",
                self.leaderboard.max_username_len
            )));
        }
        if username.chars().any(char::is_control) {
            return Err(ServiceError::InvalidUsername(String::from(
                "username must not contain control characters",
            )));
        }
        Ok(())
    }
}

/// Log persistence failures at the point they surface.
fn log_store_error(action: &'static str, username: &str, err: ServiceError) -> ServiceError {
    if let ServiceError::Persistence(ref e) = err {
        error!(action, username, error = %e, "Score store write failed");
    }
    err
}
