//! The narrow interface every score backend implements.

use std::future::Future;

use clickboard_types::UserRecord;

use crate::error::DbError;

/// Persistent `username -> score` mapping.
///
/// Implementations must be linearizable: concurrent [`increment`] calls on
/// the same username never lose an update, and a reader observes either the
/// state before or after a mutation, never a torn one. Mutating calls are
/// write-through; when they return `Ok` the new state is durable for that
/// backend, and when they return `Err` the state is exactly as before.
///
/// [`increment`]: ScoreStore::increment
pub trait ScoreStore: Send + Sync + 'static {
    /// Current score of `username`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if the user is not registered.
    fn get(&self, username: &str) -> impl Future<Output = Result<u64, DbError>> + Send;

    /// Add `delta` to the score of `username` and return the new score.
    ///
    /// Scores saturate at [`u64::MAX`].
    ///
    /// # Errors
    ///
    /// Returns [`DbError::NotFound`] if the user is not registered, or an
    /// I/O / serialization error if the new state could not be persisted.
    fn increment(
        &self,
        username: &str,
        delta: u64,
    ) -> impl Future<Output = Result<u64, DbError>> + Send;

    /// Register `username` with a score of zero.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::AlreadyExists`] if the name is taken, or an I/O /
    /// serialization error if the new state could not be persisted.
    fn register(&self, username: &str) -> impl Future<Output = Result<(), DbError>> + Send;

    /// Every registered user, ordered by username ascending.
    ///
    /// # Errors
    ///
    /// Backends that read lazily may return an I/O error.
    fn list_all(&self) -> impl Future<Output = Result<Vec<UserRecord>, DbError>> + Send;
}
