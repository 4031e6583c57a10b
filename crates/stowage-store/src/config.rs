//! Store configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Namespace label used for in-memory stores unless overridden
pub const DEFAULT_MEMORY_IDENTIFIER: &str = "MemoryStore";

/// Database file used for persistent stores unless overridden
pub const DEFAULT_STORE_PATH: &str = "stowage.redb";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Selects which backing store a facade opens.
///
/// The choice is read once when the facade is constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Use the ephemeral in-memory store instead of the database file
    pub in_memory: bool,

    /// Database file for the persistent store
    pub path: PathBuf,

    /// Label of the in-memory namespace
    pub memory_identifier: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            in_memory: false,
            path: PathBuf::from(DEFAULT_STORE_PATH),
            memory_identifier: DEFAULT_MEMORY_IDENTIFIER.to_string(),
        }
    }
}

impl StoreConfig {
    /// Persistent store backed by the file at `path`
    pub fn persistent(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Self::default()
        }
    }

    /// Ephemeral store under the default namespace
    pub fn in_memory() -> Self {
        Self {
            in_memory: true,
            ..Self::default()
        }
    }

    pub fn with_memory_identifier(mut self, identifier: impl Into<String>) -> Self {
        self.memory_identifier = identifier.into();
        self
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a config from a JSON file. Missing fields take their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}
