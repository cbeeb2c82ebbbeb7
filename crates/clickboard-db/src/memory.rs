//! In-memory score backend.
//!
//! Holds the mapping in a [`BTreeMap`] behind a [`RwLock`]. Nothing is
//! written anywhere, so the state is lost on restart. Used by tests and by
//! `store.backend: memory` deployments.

use std::collections::BTreeMap;

use clickboard_types::UserRecord;
use tokio::sync::RwLock;

use crate::error::DbError;
use crate::store::ScoreStore;

/// A [`ScoreStore`] that keeps everything in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<BTreeMap<String, u64>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScoreStore for MemoryStore {
    async fn get(&self, username: &str) -> Result<u64, DbError> {
        let users = self.users.read().await;
        users
            .get(username)
            .copied()
            .ok_or_else(|| DbError::NotFound(username.to_owned()))
    }

    async fn increment(&self, username: &str, delta: u64) -> Result<u64, DbError> {
        let mut users = self.users.write().await;
        let score = users
            .get_mut(username)
            .ok_or_else(|| DbError::NotFound(username.to_owned()))?;
        *score = score.saturating_add(delta);
        Ok(*score)
    }

    async fn register(&self, username: &str) -> Result<(), DbError> {
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(DbError::AlreadyExists(username.to_owned()));
        }
        users.insert(username.to_owned(), 0);
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<UserRecord>, DbError> {
        let users = self.users.read().await;
        Ok(users
            .iter()
            .map(|(username, score)| UserRecord {
                username: username.clone(),
                score: *score,
            })
            .collect())
    }
}
