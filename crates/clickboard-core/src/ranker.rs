//! Leaderboard ranking.
//!
//! Rankings are never cached. Every call re-reads the full record list from
//! the [`ScoreStore`] and sorts it, so a view can never be staler than the
//! store itself. Data volumes are small enough that correctness wins over
//! latency here.
//!
//! Ordering is score descending, then username ascending. The username
//! tie-break makes positions deterministic regardless of how a backend
//! iterates its records.

use std::cmp::Reverse;
use std::sync::Arc;

use clickboard_db::{DbError, ScoreStore};
use clickboard_types::{LeaderboardEntry, UserRecord};

/// Sort `records` into leaderboard order and assign 1-based positions.
pub fn rank(mut records: Vec<UserRecord>) -> Vec<LeaderboardEntry> {
    records.sort_by(|a, b| {
        Reverse(a.score)
            .cmp(&Reverse(b.score))
            .then_with(|| a.username.cmp(&b.username))
    });

    (1_u32..)
        .zip(records)
        .map(|(position, record)| LeaderboardEntry {
            username: record.username,
            score: record.score,
            position,
        })
        .collect()
}

/// Derives ranked views from a [`ScoreStore`] on demand.
#[derive(Debug)]
pub struct Ranker<S> {
    store: Arc<S>,
}

impl<S> Clone for Ranker<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ScoreStore> Ranker<S> {
    /// Create a ranker reading from `store`.
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// The first `n` leaderboard entries.
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub async fn top_n(&self, n: usize) -> Result<Vec<LeaderboardEntry>, DbError> {
        let mut ranked = rank(self.store.list_all().await?);
        ranked.truncate(n);
        Ok(ranked)
    }

    /// The 1-based position of `username`, or 0 if it is not in the store.
    ///
    /// Absence is an expected outcome here, not an error.
    ///
    /// # Errors
    ///
    /// Propagates store read failures.
    pub async fn position_of(&self, username: &str) -> Result<u32, DbError> {
        let ranked = rank(self.store.list_all().await?);
        Ok(ranked
            .iter()
            .find(|entry| entry.username == username)
            .map_or(0, |entry| entry.position))
    }
}
