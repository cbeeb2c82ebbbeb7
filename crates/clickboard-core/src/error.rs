//! Error taxonomy for the leaderboard service.
//!
//! Connection delivery failures are deliberately absent: they are handled
//! inside the [`Broadcaster`](crate::broadcaster::Broadcaster) by pruning
//! the dead connection and never reach a caller.

use clickboard_db::DbError;

/// Errors returned by [`LeaderboardService`](crate::service::LeaderboardService).
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// The username is not registered.
    #[error("user not found: {0}")]
    NotFound(String),

    /// The username is already registered.
    #[error("username already taken: {0}")]
    AlreadyExists(String),

    /// The username failed validation.
    #[error("invalid username: {0}")]
    InvalidUsername(String),

    /// The store could not persist or read state.
    #[error("persistence failure: {0}")]
    Persistence(#[source] DbError),
}

impl From<DbError> for ServiceError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(name) => Self::NotFound(name),
            DbError::AlreadyExists(name) => Self::AlreadyExists(name),
            other @ (DbError::Io(_) | DbError::Serialization(_)) => Self::Persistence(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn db_lookup_errors_keep_their_kind() {
        assert!(matches!(
            ServiceError::from(DbError::NotFound(String::from("carol"))),
            ServiceError::NotFound(name) if name == "carol"
        ));
        assert!(matches!(
            ServiceError::from(DbError::AlreadyExists(String::from("alice"))),
            ServiceError::AlreadyExists(_)
        ));
    }

    #[test]
    fn io_errors_become_persistence_failures() {
        let io = std::io::Error::other("disk full");
        assert!(matches!(
            ServiceError::from(DbError::Io(io)),
            ServiceError::Persistence(DbError::Io(_))
        ));
    }
}
