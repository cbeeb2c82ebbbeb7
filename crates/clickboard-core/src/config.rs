//! Configuration loading and typed config structures for Clickboard.
//!
//! The configuration lives in `clickboard.yaml`. Every field has a default,
//! so an absent file or a partial file is valid. This module defines the
//! strongly-typed structs that mirror the YAML structure and a loader that
//! reads the file and applies environment overrides.
//!
//! ```yaml
//! server:
//!   host: 0.0.0.0
//!   port: 6543
//!   cors_origins:
//!     - http://localhost:5173
//! store:
//!   backend: json_file
//!   path: database.json
//! leaderboard:
//!   size: 10
//!   max_username_len: 32
//! connections:
//!   outbound_buffer: 64
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// An environment override held a value of the wrong type.
    #[error("invalid value {value:?} for environment variable {name}: {source}")]
    InvalidEnv {
        /// Name of the environment variable.
        name: &'static str,
        /// The rejected value.
        value: String,
        /// Why the value was rejected.
        source: std::num::ParseIntError,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level service configuration.
///
/// Mirrors the structure of `clickboard.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClickboardConfig {
    /// HTTP listener and CORS settings.
    #[serde(default)]
    pub server: HttpConfig,

    /// Score store backend selection.
    #[serde(default)]
    pub store: StoreConfig,

    /// Leaderboard shape and username rules.
    #[serde(default)]
    pub leaderboard: LeaderboardConfig,

    /// Per-connection delivery settings.
    #[serde(default)]
    pub connections: ConnectionsConfig,
}

impl ClickboardConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `CLICKBOARD_HOST` overrides `server.host`
    /// - `CLICKBOARD_PORT` overrides `server.port`
    /// - `CLICKBOARD_DB_FILE` overrides `store.path`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::InvalidEnv`] if an override cannot be parsed.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse configuration from a YAML string without env overrides.
    ///
    /// An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Override values with environment variables when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEnv`] if `CLICKBOARD_PORT` is not a
    /// valid port number.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("CLICKBOARD_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = std::env::var("CLICKBOARD_PORT") {
            self.server.port = parse_port("CLICKBOARD_PORT", val)?;
        }
        if let Ok(val) = std::env::var("CLICKBOARD_DB_FILE") {
            self.store.path = PathBuf::from(val);
        }
        Ok(())
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HttpConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Allowed CORS origins. Empty allows any origin.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
        }
    }
}

/// Which [`ScoreStore`](clickboard_db::ScoreStore) implementation to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Volatile in-process map.
    Memory,
    /// Write-through JSON document on disk.
    #[default]
    JsonFile,
}

/// Score store configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Backend selection.
    #[serde(default)]
    pub backend: StoreBackend,

    /// Path of the JSON document (ignored by the memory backend).
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            path: default_store_path(),
        }
    }
}

/// Leaderboard configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LeaderboardConfig {
    /// Number of entries in every leaderboard view and broadcast.
    #[serde(default = "default_leaderboard_size")]
    pub size: usize,

    /// Maximum username length in bytes.
    #[serde(default = "default_max_username_len")]
    pub max_username_len: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            size: default_leaderboard_size(),
            max_username_len: default_max_username_len(),
        }
    }
}

/// Per-connection delivery configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ConnectionsConfig {
    /// Depth of each connection's outbound queue. A connection whose queue
    /// is full when a message is fanned out is treated as dead.
    #[serde(default = "default_outbound_buffer")]
    pub outbound_buffer: usize,
}

impl Default for ConnectionsConfig {
    fn default() -> Self {
        Self {
            outbound_buffer: default_outbound_buffer(),
        }
    }
}

fn default_host() -> String {
    String::from("0.0.0.0")
}

fn parse_port(name: &'static str, value: String) -> Result<u16, ConfigError> {
    value
        .parse()
        .map_err(|source| ConfigError::InvalidEnv {
            name,
            value,
            source,
        })
}

const fn default_port() -> u16 {
    6543
}

fn default_store_path() -> PathBuf {
    PathBuf::from("database.json")
}

const fn default_leaderboard_size() -> usize {
    10
}

const fn default_max_username_len() -> usize {
    32
}

const fn default_outbound_buffer() -> usize {
    64
}
