// ABOUTME: Storage operations for authorization grants
// ABOUTME: Issuance with hashed tokens, point lookups, and revocation over SQLite

use std::sync::Arc;

use async_trait::async_trait;
use latchkey_security::SecretsConfig;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{TokenError, TokenResult};
use crate::finder::TokenFinder;
use crate::issuance::{plaintext_from, require_ownership, stored_value};
use crate::resolver::TokenResolver;
use crate::revocation::RevocationManager;
use crate::types::{
    timestamp_now, AccessGrant, CredentialKind, Expiry, Issued, NewAccessGrant, SecretSource,
    TokenAttribute,
};

#[derive(Clone)]
pub struct SqliteGrantStore {
    pool: SqlitePool,
    secrets: Arc<SecretsConfig>,
}

impl SqliteGrantStore {
    pub fn new(pool: SqlitePool, secrets: Arc<SecretsConfig>) -> Self {
        Self { pool, secrets }
    }

    /// Resolver sharing this store's pool and hashing configuration
    pub fn resolver(&self) -> TokenResolver<Self> {
        TokenResolver::new(self.clone(), self.secrets.clone())
    }

    pub fn revocations(&self) -> RevocationManager {
        RevocationManager::new(self.pool.clone(), CredentialKind::AccessGrant)
    }

    /// Persist a new grant holding only the mapped token.
    ///
    /// The plaintext is handed back once in [`Issued`]; a duplicate stored
    /// value fails with [`TokenError::Uniqueness`] and is not retried.
    pub async fn issue(
        &self,
        input: NewAccessGrant,
        source: SecretSource,
    ) -> TokenResult<Issued<AccessGrant>> {
        let ownership = require_ownership(
            input.resource_owner_id,
            input.application_id,
            input.expires_in,
        )?;
        let redirect_uri = input
            .redirect_uri
            .filter(|uri| !uri.trim().is_empty())
            .ok_or_else(|| TokenError::Validation("redirect_uri is required".to_string()))?;

        let plaintext = plaintext_from(source)?;
        let policy = self.secrets.snapshot();
        let token = stored_value(&policy, &plaintext)?;

        let grant = AccessGrant {
            id: Uuid::new_v4().to_string(),
            resource_owner_id: ownership.resource_owner_id,
            application_id: ownership.application_id,
            token,
            expires_in: ownership.expires_in,
            redirect_uri,
            created_at: timestamp_now(),
            revoked_at: None,
        };

        sqlx::query(
            "INSERT INTO access_grants
                (id, resource_owner_id, application_id, token, expires_in, redirect_uri, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&grant.id)
        .bind(grant.resource_owner_id)
        .bind(grant.application_id)
        .bind(&grant.token)
        .bind(grant.expires_in.to_column())
        .bind(&grant.redirect_uri)
        .bind(grant.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| TokenError::from_insert(e, CredentialKind::AccessGrant))?;

        debug!(
            "Issued access grant {} for application {} (hashed: {})",
            grant.id,
            grant.application_id,
            policy.hashing_enabled()
        );

        Ok(Issued {
            record: grant,
            plaintext_token: plaintext,
            plaintext_refresh_token: None,
        })
    }

    pub async fn find_by_id(&self, id: &str) -> TokenResult<Option<AccessGrant>> {
        let row = sqlx::query(
            "SELECT id, resource_owner_id, application_id, token, expires_in, redirect_uri,
                    created_at, revoked_at
             FROM access_grants
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_grant(&row)).transpose()
    }

    pub async fn revoke(&self, id: &str) -> TokenResult<bool> {
        self.revocations().revoke(id).await
    }

    pub async fn revoke_all_for(
        &self,
        application_id: i64,
        resource_owner_id: i64,
    ) -> TokenResult<u64> {
        self.revocations()
            .revoke_all_for(application_id, resource_owner_id)
            .await
    }

    /// Helper to convert database row to AccessGrant
    fn row_to_grant(row: &SqliteRow) -> TokenResult<AccessGrant> {
        Ok(AccessGrant {
            id: row.try_get("id")?,
            resource_owner_id: row.try_get("resource_owner_id")?,
            application_id: row.try_get("application_id")?,
            token: row.try_get("token")?,
            expires_in: Expiry::from_column(row.try_get("expires_in")?),
            redirect_uri: row.try_get("redirect_uri")?,
            created_at: row.try_get("created_at")?,
            revoked_at: row.try_get("revoked_at")?,
        })
    }
}

#[async_trait]
impl TokenFinder for SqliteGrantStore {
    type Record = AccessGrant;

    async fn find_one_by(
        &self,
        attribute: TokenAttribute,
        value: &str,
    ) -> TokenResult<Option<AccessGrant>> {
        let query = match attribute {
            TokenAttribute::Token => {
                "SELECT id, resource_owner_id, application_id, token, expires_in, redirect_uri,
                        created_at, revoked_at
                 FROM access_grants
                 WHERE token = ?"
            }
            TokenAttribute::RefreshToken => {
                return Err(TokenError::UnsupportedAttribute {
                    kind: CredentialKind::AccessGrant,
                    attribute,
                })
            }
        };

        let row = sqlx::query(query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_grant(&row)).transpose()
    }
}
