//! Registry of live `WebSocket` connections.
//!
//! A [`Connection`] is the sending half of a bounded queue. The receiving
//! half belongs to the task that owns the socket and forwards queued
//! frames to the client, so pushing to a connection never waits on the
//! network.
//!
//! Connections are registered either under a username (personal channel,
//! any number per user) or in the flat, anonymous subscriber set. Both
//! sets sit behind one lock: a reader sees a connection fully added or not
//! at all, and [`ConnectionRegistry::remove`] takes it out of every set in
//! one step.

use std::collections::BTreeMap;
use std::sync::Arc;

use clickboard_types::ConnectionId;
use tokio::sync::{RwLock, mpsc};
use tracing::debug;

/// A serialized text frame shared across every recipient of a fanout.
pub type Frame = Arc<str>;

/// Why a frame could not be queued on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The socket task has exited and dropped its receiver.
    Closed,
    /// The client is not draining its queue fast enough.
    Full,
}

/// Handle for pushing frames to one connected client.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    tx: mpsc::Sender<Frame>,
}

impl Connection {
    /// Create a connection with a fresh id and an outbound queue holding up
    /// to `capacity` frames (at least one).
    ///
    /// Returns the handle together with the receiver the socket task drains.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (
            Self {
                id: ConnectionId::new(),
                tx,
            },
            rx,
        )
    }

    /// This connection's identifier.
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Queue `frame` without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryFailure`] when the receiver is gone or the queue is
    /// full. Either way the connection should be considered dead.
    pub fn try_deliver(&self, frame: &Frame) -> Result<(), DeliveryFailure> {
        self.tx.try_send(Arc::clone(frame)).map_err(|e| match e {
            mpsc::error::TrySendError::Closed(_) => DeliveryFailure::Closed,
            mpsc::error::TrySendError::Full(_) => DeliveryFailure::Full,
        })
    }
}

/// Snapshot of registry sizes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryCounts {
    /// Total personal connections across all usernames.
    pub personal: usize,
    /// Leaderboard subscriber connections.
    pub subscribers: usize,
}

#[derive(Debug, Default)]
struct RegistryInner {
    /// username -> that user's personal connections.
    personal: BTreeMap<String, BTreeMap<ConnectionId, Connection>>,
    /// Reverse index for removal by id.
    owners: BTreeMap<ConnectionId, String>,
    subscribers: BTreeMap<ConnectionId, Connection>,
}

/// Thread-safe registry of personal and leaderboard connections.
///
/// The internal maps are never handed out; lookups return cloned handles.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    inner: RwLock<RegistryInner>,
}

impl ConnectionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `connection` as a personal channel of `username`.
    pub async fn add_personal(&self, username: &str, connection: Connection) {
        let id = connection.id();
        let mut inner = self.inner.write().await;
        inner
            .personal
            .entry(username.to_owned())
            .or_default()
            .insert(id, connection);
        inner.owners.insert(id, username.to_owned());
        debug!(%id, username, "Personal connection registered");
    }

    /// Register `connection` as an anonymous leaderboard subscriber.
    pub async fn add_subscriber(&self, connection: Connection) {
        let id = connection.id();
        self.inner.write().await.subscribers.insert(id, connection);
        debug!(%id, "Leaderboard subscriber registered");
    }

    /// Remove the connection `id` from every set it belongs to.
    ///
    /// Unknown or already-removed ids are a no-op. Returns `true` if
    /// anything was removed.
    pub async fn remove(&self, id: ConnectionId) -> bool {
        let mut inner = self.inner.write().await;
        let mut removed = false;

        if let Some(username) = inner.owners.remove(&id) {
            if let Some(bucket) = inner.personal.get_mut(&username) {
                removed |= bucket.remove(&id).is_some();
                if bucket.is_empty() {
                    inner.personal.remove(&username);
                }
            }
        }
        removed |= inner.subscribers.remove(&id).is_some();

        if removed {
            debug!(%id, "Connection removed from registry");
        }
        removed
    }

    /// Personal connections of `username` (possibly empty).
    pub async fn connections_for(&self, username: &str) -> Vec<Connection> {
        self.inner
            .read()
            .await
            .personal
            .get(username)
            .map(|bucket| bucket.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Every leaderboard subscriber.
    pub async fn all_subscribers(&self) -> Vec<Connection> {
        self.inner
            .read()
            .await
            .subscribers
            .values()
            .cloned()
            .collect()
    }

    /// Current registry sizes.
    pub async fn counts(&self) -> RegistryCounts {
        let inner = self.inner.read().await;
        RegistryCounts {
            personal: inner.owners.len(),
            subscribers: inner.subscribers.len(),
        }
    }
}
