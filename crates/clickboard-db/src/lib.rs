//! Score store for the Clickboard leaderboard service.
//!
//! The store is the single source of truth for `username -> score`. Callers
//! only see the narrow [`ScoreStore`] interface, so the backing medium can
//! be swapped without touching the ranking or fanout code.
//!
//! # Architecture
//!
//! ```text
//! LeaderboardService
//!     |
//!     +-- ScoreStore (trait)
//!         |-- MemoryStore    (BTreeMap, no I/O; tests and ephemeral runs)
//!         +-- JsonFileStore  (write-through JSON document, atomic rename)
//! ```
//!
//! # Modules
//!
//! - [`store`] -- The [`ScoreStore`] trait
//! - [`memory`] -- In-memory backend
//! - [`json_file`] -- JSON file backend with self-healing open
//! - [`error`] -- Shared error types

pub mod error;
pub mod json_file;
pub mod memory;
pub mod store;

// Re-export primary types for convenience.
pub use error::DbError;
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use store::ScoreStore;
