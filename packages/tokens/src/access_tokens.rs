// ABOUTME: Storage operations for bearer access tokens and their refresh tokens
// ABOUTME: Both token columns are mapped with the active strategy and resolvable independently

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
    timestamp_now, AccessToken, CredentialKind, Expiry, Issued, NewAccessToken, SecretSource,
    TokenAttribute,
};

#[derive(Clone)]
pub struct SqliteAccessTokenStore {
    pool: SqlitePool,
    secrets: Arc<SecretsConfig>,
}

impl SqliteAccessTokenStore {
    pub fn new(pool: SqlitePool, secrets: Arc<SecretsConfig>) -> Self {
        Self { pool, secrets }
    }

    pub fn resolver(&self) -> TokenResolver<Self> {
        TokenResolver::new(self.clone(), self.secrets.clone())
    }

    pub fn revocations(&self) -> RevocationManager {
        RevocationManager::new(self.pool.clone(), CredentialKind::AccessToken)
    }

    /// Persist a new access token, generating a refresh token when requested.
    ///
    /// `source` supplies the access token only; refresh tokens are always
    /// generated. Both are mapped with the same policy snapshot.
    pub async fn issue(
        &self,
        input: NewAccessToken,
        source: SecretSource,
    ) -> TokenResult<Issued<AccessToken>> {
        let ownership = require_ownership(
            input.resource_owner_id,
            input.application_id,
            input.expires_in,
        )?;

        let plaintext = plaintext_from(source)?;
        let plaintext_refresh = if input.use_refresh_token {
            Some(plaintext_from(SecretSource::Generate)?)
        } else {
            None
        };

        let policy = self.secrets.snapshot();
        let token = stored_value(&policy, &plaintext)?;
        let refresh_token = plaintext_refresh
            .as_ref()
            .map(|secret| stored_value(&policy, secret))
            .transpose()?;

        let access_token = AccessToken {
            id: Uuid::new_v4().to_string(),
            resource_owner_id: ownership.resource_owner_id,
            application_id: ownership.application_id,
            token,
            refresh_token,
            expires_in: ownership.expires_in,
            created_at: timestamp_now(),
            revoked_at: None,
        };

        sqlx::query(
            "INSERT INTO access_tokens
                (id, resource_owner_id, application_id, token, refresh_token,
                 expires_in, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&access_token.id)
        .bind(access_token.resource_owner_id)
        .bind(access_token.application_id)
        .bind(&access_token.token)
        .bind(&access_token.refresh_token)
        .bind(access_token.expires_in.to_column())
        .bind(access_token.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| TokenError::from_insert(e, CredentialKind::AccessToken))?;

        debug!(
            "Issued access token {} for application {} (refresh: {}, hashed: {})",
            access_token.id,
            access_token.application_id,
            access_token.refresh_token.is_some(),
            policy.hashing_enabled()
        );

        Ok(Issued {
            record: access_token,
            plaintext_token: plaintext,
            plaintext_refresh_token: plaintext_refresh,
        })
    }

    pub async fn find_by_id(&self, id: &str) -> TokenResult<Option<AccessToken>> {
        let row = sqlx::query(
            "SELECT id, resource_owner_id, application_id, token, refresh_token, expires_in,
                    created_at, revoked_at
             FROM access_tokens
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| Self::row_to_access_token(&row)).transpose()
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

    fn row_to_access_token(row: &SqliteRow) -> TokenResult<AccessToken> {
        Ok(AccessToken {
            id: row.try_get("id")?,
            resource_owner_id: row.try_get("resource_owner_id")?,
            application_id: row.try_get("application_id")?,
            token: row.try_get("token")?,
            refresh_token: row.try_get("refresh_token")?,
            expires_in: Expiry::from_column(row.try_get("expires_in")?),
            created_at: row.try_get("created_at")?,
            revoked_at: row.try_get("revoked_at")?,
        })
    }
}

#[async_trait]
impl TokenFinder for SqliteAccessTokenStore {
    type Record = AccessToken;

    async fn find_one_by(
        &self,
        attribute: TokenAttribute,
        value: &str,
    ) -> TokenResult<Option<AccessToken>> {
        let query = match attribute {
            TokenAttribute::Token => {
                "SELECT id, resource_owner_id, application_id, token, refresh_token, expires_in,
                        created_at, revoked_at
                 FROM access_tokens
                 WHERE token = ?"
            }
            TokenAttribute::RefreshToken => {
                "SELECT id, resource_owner_id, application_id, token, refresh_token, expires_in,
                        created_at, revoked_at
                 FROM access_tokens
                 WHERE refresh_token = ?"
            }
        };

        let row = sqlx::query(query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|row| Self::row_to_access_token(&row)).transpose()
    }
}
