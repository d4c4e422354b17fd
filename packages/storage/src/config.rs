// ABOUTME: Storage configuration with environment overrides
// ABOUTME: Database location and SQLite connection tuning

use std::path::PathBuf;

use latchkey_config::{constants, env};
use serde::{Deserialize, Serialize};

use crate::StorageResult;

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: PathBuf,
    pub enable_wal: bool,
    pub max_connections: u32,
    pub busy_timeout_seconds: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: latchkey_dir().join("latchkey.db"),
            enable_wal: true,
            max_connections: 10,
            busy_timeout_seconds: 30,
        }
    }
}

impl StorageConfig {
    /// Build from `LATCHKEY_DB_*` variables, falling back to the defaults
    pub fn from_env() -> StorageResult<Self> {
        let defaults = Self::default();

        Ok(Self {
            path: env::var(constants::LATCHKEY_DATABASE_PATH)
                .map(PathBuf::from)
                .unwrap_or(defaults.path),
            enable_wal: env::bool_or(constants::LATCHKEY_DB_ENABLE_WAL, defaults.enable_wal)?,
            max_connections: env::number_or(
                constants::LATCHKEY_DB_MAX_CONNECTIONS,
                defaults.max_connections,
            )?,
            busy_timeout_seconds: env::number_or(
                constants::LATCHKEY_DB_BUSY_TIMEOUT_SECS,
                defaults.busy_timeout_seconds,
            )?,
        })
    }
}

/// Get the path to the Latchkey directory (~/.latchkey)
pub fn latchkey_dir() -> PathBuf {
    // HOME first so tests can redirect it
    if let Some(home) = env::var(constants::HOME) {
        PathBuf::from(home).join(".latchkey")
    } else {
        dirs::home_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(".latchkey")
    }
}
