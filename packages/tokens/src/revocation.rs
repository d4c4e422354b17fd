// ABOUTME: Revocation of credentials, singly or for an application and owner pair
// ABOUTME: Only revoked_at is ever written; already revoked rows are left untouched

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::TokenResult;
use crate::types::{timestamp_now, CredentialKind};

pub struct RevocationManager {
    pool: SqlitePool,
    kind: CredentialKind,
}

impl RevocationManager {
    pub fn new(pool: SqlitePool, kind: CredentialKind) -> Self {
        Self { pool, kind }
    }

    /// Revoke every active credential issued to `resource_owner_id` through
    /// `application_id`. Returns how many records changed, so a repeat call
    /// returns 0.
    pub async fn revoke_all_for(
        &self,
        application_id: i64,
        resource_owner_id: i64,
    ) -> TokenResult<u64> {
        let query = match self.kind {
            CredentialKind::AccessGrant => {
                "UPDATE access_grants
                 SET revoked_at = ?
                 WHERE application_id = ? AND resource_owner_id = ? AND revoked_at IS NULL"
            }
            CredentialKind::AccessToken => {
                "UPDATE access_tokens
                 SET revoked_at = ?
                 WHERE application_id = ? AND resource_owner_id = ? AND revoked_at IS NULL"
            }
        };

        let result = sqlx::query(query)
            .bind(timestamp_now())
            .bind(application_id)
            .bind(resource_owner_id)
            .execute(&self.pool)
            .await?;

        let revoked = result.rows_affected();
        info!(
            "Revoked {} {} record(s) for application {} and owner {}",
            revoked, self.kind, application_id, resource_owner_id
        );
        Ok(revoked)
    }

    /// Revoke one credential; false when it is missing or already revoked
    pub async fn revoke(&self, id: &str) -> TokenResult<bool> {
        let query = match self.kind {
            CredentialKind::AccessGrant => {
                "UPDATE access_grants SET revoked_at = ? WHERE id = ? AND revoked_at IS NULL"
            }
            CredentialKind::AccessToken => {
                "UPDATE access_tokens SET revoked_at = ? WHERE id = ? AND revoked_at IS NULL"
            }
        };

        let result = sqlx::query(query)
            .bind(timestamp_now())
            .bind(id)
            .execute(&self.pool)
            .await?;

        let revoked = result.rows_affected() > 0;
        debug!("Revoke {} {}: changed = {}", self.kind, id, revoked);
        Ok(revoked)
    }
}
