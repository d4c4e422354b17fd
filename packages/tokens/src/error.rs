// ABOUTME: Error types for credential lookup, issuance, and revocation
// ABOUTME: "Not found" is never an error; only invalid input and genuine faults are

use latchkey_config::ConfigError;
use latchkey_storage::StorageError;
use thiserror::Error;

use crate::types::{CredentialKind, TokenAttribute};

pub type TokenResult<T> = Result<T, TokenError>;

#[derive(Error, Debug)]
pub enum TokenError {
    #[error("Validation failed: {0}")]
    Validation(String),

    /// The caller should generate a new secret and issue again
    #[error("Duplicate {attribute} for {kind}")]
    Uniqueness {
        kind: CredentialKind,
        attribute: TokenAttribute,
    },

    #[error("Invalid secret hashing configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("{kind} records cannot be looked up by {attribute}")]
    UnsupportedAttribute {
        kind: CredentialKind,
        attribute: TokenAttribute,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl From<sqlx::Error> for TokenError {
    fn from(err: sqlx::Error) -> Self {
        TokenError::Storage(StorageError::Sqlx(err))
    }
}

impl TokenError {
    /// Translate an INSERT failure, surfacing unique index violations as `Uniqueness`
    pub(crate) fn from_insert(err: sqlx::Error, kind: CredentialKind) -> Self {
        let err = StorageError::Sqlx(err);
        if !err.is_unique_violation() {
            return TokenError::Storage(err);
        }

        // SQLite reports the offending column as "UNIQUE constraint failed: <table>.<column>"
        let attribute = if err.to_string().contains(".refresh_token") {
            TokenAttribute::RefreshToken
        } else {
            TokenAttribute::Token
        };

        TokenError::Uniqueness { kind, attribute }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use latchkey_storage::memory_pool;
    use sqlx::SqlitePool;

    async fn insert_token(
        pool: &SqlitePool,
        id: &str,
        token: &str,
        refresh_token: Option<&str>,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "INSERT INTO access_tokens
                (id, resource_owner_id, application_id, token, refresh_token,
                 expires_in, created_at)
             VALUES (?, 1, 1, ?, ?, 3600, '2025-01-01T00:00:00Z')",
        )
        .bind(id)
        .bind(token)
        .bind(refresh_token)
        .execute(pool)
        .await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_token_collision_names_refresh_attribute() {
        let pool = memory_pool().await.unwrap();
        insert_token(&pool, "t1", "access-1", Some("refresh-shared"))
            .await
            .unwrap();

        let err = insert_token(&pool, "t2", "access-2", Some("refresh-shared"))
            .await
            .unwrap_err();

        match TokenError::from_insert(err, CredentialKind::AccessToken) {
            TokenError::Uniqueness { kind, attribute } => {
                assert_eq!(kind, CredentialKind::AccessToken);
                assert_eq!(attribute, TokenAttribute::RefreshToken);
            }
            other => panic!("expected uniqueness error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_access_token_collision_names_token_attribute() {
        let pool = memory_pool().await.unwrap();
        insert_token(&pool, "t1", "access-shared", Some("refresh-1"))
            .await
            .unwrap();

        let err = insert_token(&pool, "t2", "access-shared", Some("refresh-2"))
            .await
            .unwrap_err();

        assert!(matches!(
            TokenError::from_insert(err, CredentialKind::AccessToken),
            TokenError::Uniqueness {
                kind: CredentialKind::AccessToken,
                attribute: TokenAttribute::Token,
            }
        ));
    }

    #[tokio::test]
    async fn test_other_insert_failures_stay_storage_errors() {
        let pool = memory_pool().await.unwrap();
        let err = sqlx::query("INSERT INTO missing_table (id) VALUES (1)")
            .execute(&pool)
            .await
            .unwrap_err();

        assert!(matches!(
            TokenError::from_insert(err, CredentialKind::AccessGrant),
            TokenError::Storage(_)
        ));
    }
}
