//! Server-pushed `WebSocket` message envelope.
//!
//! Every frame the server sends is a JSON object of the form
//! `{"type": "...", "data": ...}`:
//!
//! | `type` | `data` | Channel |
//! |--------|--------|---------|
//! | `score_update` | [`ScoreUpdate`] | `/ws/user/{username}` |
//! | `leaderboard_update` | `[LeaderboardEntry]` | `/ws/leaderboard` |
//!
//! Clients treat each `leaderboard_update` as a full replacement of their
//! local leaderboard, never as a diff.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::structs::{LeaderboardEntry, ScoreUpdate};

/// A message pushed from the server to a connected client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum ServerMessage {
    /// A user's own score changed.
    ScoreUpdate(ScoreUpdate),
    /// The top of the leaderboard was recomputed.
    LeaderboardUpdate(Vec<LeaderboardEntry>),
}

impl ServerMessage {
    /// The value of the `type` tag, for log fields.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::ScoreUpdate(_) => "score_update",
            Self::LeaderboardUpdate(_) => "leaderboard_update",
        }
    }

    /// Serialize the envelope to its JSON text frame.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`serde_json::Error`] if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn score_update_envelope_shape() {
        let msg = ServerMessage::ScoreUpdate(ScoreUpdate {
            new_score: 11,
            position: 2,
        });
        let json: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "score_update",
                "data": {"new_score": 11, "position": 2}
            })
        );
        assert_eq!(msg.kind(), "score_update");
    }

    #[test]
    fn leaderboard_update_envelope_shape() {
        let msg = ServerMessage::LeaderboardUpdate(vec![LeaderboardEntry {
            username: String::from("bob"),
            score: 10,
            position: 1,
        }]);
        let json: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(json["type"], "leaderboard_update");
        assert_eq!(json["data"][0]["username"], "bob");
        assert_eq!(json["data"][0]["position"], 1);
    }

    #[test]
    fn empty_leaderboard_has_empty_data_array() {
        let msg = ServerMessage::LeaderboardUpdate(Vec::new());
        let json: serde_json::Value = serde_json::from_str(&msg.to_json().unwrap()).unwrap();
        assert_eq!(json["data"], serde_json::json!([]));
    }
}
