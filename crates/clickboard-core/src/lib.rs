//! Ranking, connection tracking, and live fanout for Clickboard.
//!
//! This crate owns the update flow that runs after every score change:
//! mutate the store, re-rank from the store, push a personal
//! `score_update` to the actor's connections, then push a
//! `leaderboard_update` to every leaderboard subscriber.
//!
//! # Modules
//!
//! - [`config`] -- Configuration loading from `clickboard.yaml` into
//!   strongly-typed structs.
//! - [`ranker`] -- Derived leaderboard views, always recomputed from the
//!   store.
//! - [`registry`] -- [`ConnectionRegistry`] of personal and subscriber
//!   connections.
//! - [`broadcaster`] -- [`Broadcaster`] fanout with dead-connection pruning.
//! - [`service`] -- [`LeaderboardService`], the register/click orchestration.
//! - [`error`] -- Service-level error taxonomy.
//!
//! [`ConnectionRegistry`]: registry::ConnectionRegistry
//! [`Broadcaster`]: broadcaster::Broadcaster
//! [`LeaderboardService`]: service::LeaderboardService

pub mod broadcaster;
pub mod config;
pub mod error;
pub mod ranker;
pub mod registry;
pub mod service;

// Re-export primary types for convenience.
pub use broadcaster::{Broadcaster, DeliveryReport};
pub use config::{ClickboardConfig, ConfigError};
pub use error::ServiceError;
pub use ranker::Ranker;
pub use registry::{Connection, ConnectionRegistry, DeliveryFailure, Frame, RegistryCounts};
pub use service::LeaderboardService;
