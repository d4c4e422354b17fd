// ABOUTME: Entry point bundling the credential stores over one pool and hashing configuration
// ABOUTME: Opens the database from configuration and fails fast on invalid hashing settings

use std::sync::Arc;

use latchkey_security::SecretsConfig;
use latchkey_storage::{memory_pool, open_pool, StorageConfig};
use sqlx::SqlitePool;
use tracing::info;

use crate::access_tokens::SqliteAccessTokenStore;
use crate::error::TokenResult;
use crate::grants::SqliteGrantStore;

pub struct TokenStore {
    pool: SqlitePool,
    secrets: Arc<SecretsConfig>,
}

impl TokenStore {
    pub fn new(pool: SqlitePool, secrets: Arc<SecretsConfig>) -> Self {
        Self { pool, secrets }
    }

    pub async fn open(config: &StorageConfig, secrets: Arc<SecretsConfig>) -> TokenResult<Self> {
        let pool = open_pool(config).await?;
        Ok(Self::new(pool, secrets))
    }

    /// Load storage and hashing settings from the environment.
    ///
    /// An unusable hashing configuration is returned as an error here, before
    /// any lookup can run against the wrong representation.
    pub async fn from_env() -> TokenResult<Self> {
        let secrets = Arc::new(SecretsConfig::from_env()?);
        let config = StorageConfig::from_env()?;
        info!(
            "Opening credential store (hashing enabled: {})",
            secrets.hashing_enabled()
        );
        Self::open(&config, secrets).await
    }

    pub async fn in_memory(secrets: Arc<SecretsConfig>) -> TokenResult<Self> {
        let pool = memory_pool().await?;
        Ok(Self::new(pool, secrets))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn secrets(&self) -> &Arc<SecretsConfig> {
        &self.secrets
    }

    pub fn grants(&self) -> SqliteGrantStore {
        SqliteGrantStore::new(self.pool.clone(), self.secrets.clone())
    }

    pub fn access_tokens(&self) -> SqliteAccessTokenStore {
        SqliteAccessTokenStore::new(self.pool.clone(), self.secrets.clone())
    }
}
