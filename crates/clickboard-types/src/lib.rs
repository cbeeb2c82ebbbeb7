//! Shared type definitions for the Clickboard leaderboard service.
//!
//! This crate is the single source of truth for the records, leaderboard
//! rows and WebSocket envelopes used across the workspace. Wire types flow
//! downstream to `TypeScript` via `ts-rs` for the clicker frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers (connection identifiers)
//! - [`structs`] -- User records and derived leaderboard views
//! - [`messages`] -- Server-pushed `WebSocket` message envelope

pub mod ids;
pub mod messages;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use ids::ConnectionId;
pub use messages::ServerMessage;
pub use structs::{ClickOutcome, LeaderboardEntry, ScoreUpdate, UserRecord, UserStanding};
