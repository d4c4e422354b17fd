// ABOUTME: Data layer and persistence for Latchkey
// ABOUTME: SQLite pool setup, embedded credential schema, and storage errors

pub mod config;
pub mod sqlite;

use thiserror::Error;

pub use config::StorageConfig;
pub use sqlite::{memory_pool, open_pool, run_migrations};

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Database error: {0}")]
    Database(String),
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("Sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("Configuration error: {0}")]
    Config(#[from] latchkey_config::ConfigError),
}

impl StorageError {
    /// True when the database rejected a write because of a unique index
    pub fn is_unique_violation(&self) -> bool {
        match self {
            StorageError::Sqlx(sqlx::Error::Database(db_err)) => db_err.is_unique_violation(),
            _ => false,
        }
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
