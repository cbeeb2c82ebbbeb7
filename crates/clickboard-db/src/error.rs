//! Error types for the score store.
//!
//! [`DbError::NotFound`] and [`DbError::AlreadyExists`] are expected,
//! client-visible outcomes. [`DbError::Io`] and [`DbError::Serialization`]
//! mean a write could not be made durable; the store state is unchanged
//! when they are returned.

/// Errors that can occur in the score store.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// The username is not registered.
    #[error("user not found: {0}")]
    NotFound(String),

    /// The username is already registered.
    #[error("username already taken: {0}")]
    AlreadyExists(String),

    /// Reading or writing the backing file failed.
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The store document could not be encoded.
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
