//! User records and the leaderboard views derived from them.
//!
//! Only [`UserRecord`] is ever persisted. [`LeaderboardEntry`],
//! [`UserStanding`] and [`ScoreUpdate`] are recomputed from the store on
//! every request and exist purely as wire shapes.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Stored state
// ---------------------------------------------------------------------------

/// A registered player and their accumulated score.
///
/// The username is unique and immutable once created. The score only ever
/// grows through click increments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserRecord {
    /// Unique player name chosen at registration.
    pub username: String,
    /// Accumulated click score.
    #[ts(type = "number")]
    pub score: u64,
}

impl UserRecord {
    /// Create a record for a freshly registered user with a zero score.
    pub const fn new(username: String) -> Self {
        Self { username, score: 0 }
    }
}

// ---------------------------------------------------------------------------
// Derived views
// ---------------------------------------------------------------------------

/// One ranked row of the leaderboard.
///
/// `position` is the 1-based rank after sorting by score descending, with
/// equal scores ordered by username ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct LeaderboardEntry {
    /// Player name.
    pub username: String,
    /// Player score at the time the leaderboard was computed.
    #[ts(type = "number")]
    pub score: u64,
    /// 1-based rank.
    pub position: u32,
}

/// A single user's score together with their rank.
///
/// Returned by `GET /user/{username}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserStanding {
    /// Player name.
    pub username: String,
    /// Current score.
    #[ts(type = "number")]
    pub score: u64,
    /// 1-based rank, or 0 if the user vanished between reads.
    pub position: u32,
}

/// Payload of a `score_update` message on a personal channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ScoreUpdate {
    /// Score after the click was applied.
    #[ts(type = "number")]
    pub new_score: u64,
    /// Rank after the click was applied.
    pub position: u32,
}

/// Response body of `POST /click`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ClickOutcome {
    /// Score after the click was applied.
    #[ts(type = "number")]
    pub new_score: u64,
    /// Rank after the click was applied.
    pub position: u32,
    /// Top of the leaderboard after the click.
    pub leaderboard: Vec<LeaderboardEntry>,
}
