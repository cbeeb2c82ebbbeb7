//! Fanout of server messages to registered connections.
//!
//! A message is serialized once and the shared frame is queued on each
//! target connection without waiting. A connection that cannot take the
//! frame (socket task gone, or queue full) is dead: it is removed from the
//! registry after the pass and never tried again. One dead connection
//! never stops delivery to the rest. There are no retries.

use std::sync::Arc;

use clickboard_types::ServerMessage;
use tracing::{debug, warn};

use crate::registry::{Connection, ConnectionRegistry, Frame};

/// Outcome of one fanout pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Connections the frame was queued on.
    pub delivered: usize,
    /// Connections found dead and removed from the registry.
    pub pruned: usize,
}

/// Pushes [`ServerMessage`]s to the connections held in a
/// [`ConnectionRegistry`].
#[derive(Debug, Clone)]
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
}

impl Broadcaster {
    /// Create a broadcaster over `registry`.
    pub const fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// Deliver `message` to every personal connection of `username`.
    pub async fn send_personal(&self, username: &str, message: &ServerMessage) -> DeliveryReport {
        let targets = self.registry.connections_for(username).await;
        let report = self.fanout(targets, message).await;
        debug!(
            username,
            kind = message.kind(),
            delivered = report.delivered,
            pruned = report.pruned,
            "Personal message sent"
        );
        report
    }

    /// Deliver `message` to every leaderboard subscriber.
    pub async fn broadcast_leaderboard(&self, message: &ServerMessage) -> DeliveryReport {
        let targets = self.registry.all_subscribers().await;
        let report = self.fanout(targets, message).await;
        debug!(
            kind = message.kind(),
            delivered = report.delivered,
            pruned = report.pruned,
            "Leaderboard broadcast sent"
        );
        report
    }

    async fn fanout(&self, targets: Vec<Connection>, message: &ServerMessage) -> DeliveryReport {
        if targets.is_empty() {
            return DeliveryReport::default();
        }

        let frame: Frame = match message.to_json() {
            Ok(json) => Arc::from(json),
            Err(e) => {
                warn!(kind = message.kind(), error = %e, "Failed to serialize server message");
                return DeliveryReport::default();
            }
        };

        let mut report = DeliveryReport::default();
        let mut dead = Vec::new();
        for connection in &targets {
            match connection.try_deliver(&frame) {
                Ok(()) => report.delivered = report.delivered.saturating_add(1),
                Err(reason) => {
                    warn!(id = %connection.id(), ?reason, "Delivery failed, pruning connection");
                    dead.push(connection.id());
                }
            }
        }

        for id in dead {
            if self.registry.remove(id).await {
                report.pruned = report.pruned.saturating_add(1);
            }
        }
        report
    }
}
