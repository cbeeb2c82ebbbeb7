//! JSON file score backend.
//!
//! The whole store is one JSON document:
//!
//! ```json
//! {
//!   "users": {
//!     "alice": { "score": 1 },
//!     "bob": { "score": 10 }
//!   }
//! }
//! ```
//!
//! The document is loaded once on [`JsonFileStore::open`] and mirrored in
//! memory. Every mutation builds the next state, writes it to a sibling
//! `.tmp` file, syncs it and renames it over the original. Only after the
//! rename succeeds does the in-memory mirror advance, so a failed write
//! leaves both the file and the mirror at the previous state.
//!
//! Mutations hold the write lock across the file write, which serializes
//! them and removes the read-modify-write race of rewriting the file from
//! independent reads.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use clickboard_types::UserRecord;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::DbError;
use crate::store::ScoreStore;

/// On-disk document layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    users: Option<BTreeMap<String, StoredUser>>,
}

/// On-disk value for a single user.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct StoredUser {
    #[serde(default)]
    score: u64,
}

impl StoreDocument {
    fn from_scores(users: &BTreeMap<String, u64>) -> Self {
        Self {
            users: Some(
                users
                    .iter()
                    .map(|(name, score)| (name.clone(), StoredUser { score: *score }))
                    .collect(),
            ),
        }
    }

    fn into_scores(self) -> BTreeMap<String, u64> {
        self.users
            .unwrap_or_default()
            .into_iter()
            .map(|(name, user)| (name, user.score))
            .collect()
    }
}

/// A [`ScoreStore`] persisted as a single JSON document on disk.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    users: RwLock<BTreeMap<String, u64>>,
}

impl JsonFileStore {
    /// Open the store at `path`, creating or repairing it as needed.
    ///
    /// - A missing or empty file is (re)written with an empty document.
    /// - A file that is not valid UTF-8 JSON is moved aside to
    ///   `<path>.corrupt` and replaced with an empty document.
    ///
    /// Corrupt content never prevents the service from starting.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Io`] if the file exists but cannot be read, if a
    /// corrupt file cannot be moved aside, or if the repaired document
    /// cannot be written. The existing file is left untouched in each case.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, DbError> {
        let path = path.into();

        let loaded = match tokio::fs::read(&path).await {
            Ok(bytes) if bytes.trim_ascii().is_empty() => {
                warn!(path = %path.display(), "Score file is empty, reinitializing");
                None
            }
            Ok(bytes) => match serde_json::from_slice::<StoreDocument>(&bytes) {
                Ok(doc) => Some(doc.into_scores()),
                Err(e) => {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "Score file is corrupt, moving it aside and reinitializing"
                    );
                    tokio::fs::rename(&path, sibling(&path, ".corrupt")).await?;
                    None
                }
            },
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "Score file not found, creating it");
                None
            }
            Err(e) => return Err(DbError::Io(e)),
        };

        let users = if let Some(users) = loaded {
            users
        } else {
            let empty = BTreeMap::new();
            write_document(&path, &empty).await?;
            empty
        };

        info!(path = %path.display(), users = users.len(), "Score store opened");

        Ok(Self {
            path,
            users: RwLock::new(users),
        })
    }

    /// Path of the backing document.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ScoreStore for JsonFileStore {
    async fn get(&self, username: &str) -> Result<u64, DbError> {
        let users = self.users.read().await;
        users
            .get(username)
            .copied()
            .ok_or_else(|| DbError::NotFound(username.to_owned()))
    }

    async fn increment(&self, username: &str, delta: u64) -> Result<u64, DbError> {
        let mut users = self.users.write().await;
        let current = users
            .get(username)
            .copied()
            .ok_or_else(|| DbError::NotFound(username.to_owned()))?;
        let new_score = current.saturating_add(delta);

        let mut next = users.clone();
        next.insert(username.to_owned(), new_score);
        write_document(&self.path, &next).await?;
        *users = next;

        debug!(username, new_score, "Score persisted");
        Ok(new_score)
    }

    async fn register(&self, username: &str) -> Result<(), DbError> {
        let mut users = self.users.write().await;
        if users.contains_key(username) {
            return Err(DbError::AlreadyExists(username.to_owned()));
        }

        let mut next = users.clone();
        next.insert(username.to_owned(), 0);
        write_document(&self.path, &next).await?;
        *users = next;

        debug!(username, "User persisted");
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

/// Atomically replace the document at `path` with `users`.
async fn write_document(path: &Path, users: &BTreeMap<String, u64>) -> Result<(), DbError> {
    let json = serde_json::to_vec_pretty(&StoreDocument::from_scores(users))?;
    let tmp = sibling(path, ".tmp");

    let mut file = tokio::fs::File::create(&tmp).await?;
    file.write_all(&json).await?;
    file.sync_all().await?;
    drop(file);

    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        // Best effort; the original document is still intact.
        let _ = tokio::fs::remove_file(&tmp).await;
        return Err(DbError::Io(e));
    }
    Ok(())
}

/// `path` with `suffix` appended to its final component.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn sibling_appends_suffix() {
        assert_eq!(
            sibling(Path::new("/data/database.json"), ".tmp"),
            PathBuf::from("/data/database.json.tmp")
        );
    }

    #[test]
    fn document_tolerates_null_users_and_missing_scores() {
        let doc: StoreDocument = serde_json::from_str(r#"{"users": null}"#).unwrap();
        assert!(doc.into_scores().is_empty());

        let doc: StoreDocument = serde_json::from_str(r#"{"users": {"alice": {}}}"#).unwrap();
        assert_eq!(doc.into_scores().get("alice"), Some(&0));
    }
}
