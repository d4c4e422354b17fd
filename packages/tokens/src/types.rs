// ABOUTME: Type definitions for persisted credentials and issuance requests
// ABOUTME: Access grants, access tokens, expiry, lookup attributes, and the one-time plaintext result

use std::fmt;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};

/// Credential families; each one is an independent uniqueness namespace
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialKind {
    AccessGrant,
    AccessToken,
}

impl CredentialKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CredentialKind::AccessGrant => "access_grant",
            CredentialKind::AccessToken => "access_token",
        }
    }

    pub fn table(&self) -> &'static str {
        match self {
            CredentialKind::AccessGrant => "access_grants",
            CredentialKind::AccessToken => "access_tokens",
        }
    }
}

impl fmt::Display for CredentialKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Columns a credential can be looked up by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenAttribute {
    Token,
    RefreshToken,
}

impl TokenAttribute {
    pub fn column(&self) -> &'static str {
        match self {
            TokenAttribute::Token => "token",
            TokenAttribute::RefreshToken => "refresh_token",
        }
    }
}

impl fmt::Display for TokenAttribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// Lifetime of a credential, counted from `created_at`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expiry {
    Seconds(i64),
    Never,
}

impl Expiry {
    /// Decode the nullable `expires_in` column
    pub fn from_column(value: Option<i64>) -> Self {
        match value {
            Some(seconds) => Expiry::Seconds(seconds),
            None => Expiry::Never,
        }
    }

    pub fn to_column(&self) -> Option<i64> {
        match self {
            Expiry::Seconds(seconds) => Some(*seconds),
            Expiry::Never => None,
        }
    }
}

/// Expiry and revocation state shared by every persisted credential
pub trait Credential {
    fn id(&self) -> &str;
    fn created_at(&self) -> DateTime<Utc>;
    fn expires_in(&self) -> Expiry;
    fn revoked_at(&self) -> Option<DateTime<Utc>>;

    /// `None` for credentials that never expire (or expire past chrono's range)
    fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self.expires_in() {
            Expiry::Seconds(seconds) => Duration::try_seconds(seconds)
                .and_then(|lifetime| self.created_at().checked_add_signed(lifetime)),
            Expiry::Never => None,
        }
    }

    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at().is_some_and(|expires_at| expires_at <= now)
    }

    fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    fn is_revoked_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at().is_some_and(|revoked_at| revoked_at <= now)
    }

    fn is_revoked(&self) -> bool {
        self.is_revoked_at(Utc::now())
    }

    /// Usable for authentication: neither expired nor revoked
    fn is_accessible(&self) -> bool {
        let now = Utc::now();
        !self.is_expired_at(now) && !self.is_revoked_at(now)
    }
}

/// Authorization grant stored in database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessGrant {
    pub id: String,
    pub resource_owner_id: i64,
    pub application_id: i64,
    /// Stored representation: the hash when hashing was enabled at issuance
    pub token: String,
    pub expires_in: Expiry,
    pub redirect_uri: String,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Credential for AccessGrant {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn expires_in(&self) -> Expiry {
        self.expires_in
    }

    fn revoked_at(&self) -> Option<DateTime<Utc>> {
        self.revoked_at
    }
}

/// Bearer access token stored in database
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessToken {
    pub id: String,
    pub resource_owner_id: i64,
    pub application_id: i64,
    pub token: String,
    pub refresh_token: Option<String>,
    pub expires_in: Expiry,
    pub created_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Credential for AccessToken {
    fn id(&self) -> &str {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn expires_in(&self) -> Expiry {
        self.expires_in
    }

    fn revoked_at(&self) -> Option<DateTime<Utc>> {
        self.revoked_at
    }
}

/// Input for issuing an authorization grant; absent fields fail validation
#[derive(Debug, Clone, Default)]
pub struct NewAccessGrant {
    pub resource_owner_id: Option<i64>,
    pub application_id: Option<i64>,
    pub expires_in: Option<Expiry>,
    pub redirect_uri: Option<String>,
}

/// Input for issuing an access token
#[derive(Debug, Clone, Default)]
pub struct NewAccessToken {
    pub resource_owner_id: Option<i64>,
    pub application_id: Option<i64>,
    pub expires_in: Option<Expiry>,
    pub use_refresh_token: bool,
}

/// Where the plaintext secret of a new credential comes from
#[derive(Debug)]
pub enum SecretSource {
    Generate,
    Provided(SecretString),
}

/// Issuance result - includes plaintext secrets for display
/// This is the ONLY time the plaintext is available; records loaded later never carry it
#[derive(Debug)]
pub struct Issued<R> {
    pub record: R,
    pub plaintext_token: SecretString,
    pub plaintext_refresh_token: Option<SecretString>,
}

/// Current time at the precision the database round-trips
pub(crate) fn timestamp_now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grant(expires_in: Expiry, created_at: DateTime<Utc>) -> AccessGrant {
        AccessGrant {
            id: "grant-1".to_string(),
            resource_owner_id: 100,
            application_id: 1,
            token: "stored".to_string(),
            expires_in,
            redirect_uri: "https://app.example.com/callback".to_string(),
            created_at,
            revoked_at: None,
        }
    }

    #[test]
    fn test_expiry_column_round_trip() {
        assert_eq!(Expiry::from_column(Some(600)), Expiry::Seconds(600));
        assert_eq!(Expiry::from_column(None), Expiry::Never);
        assert_eq!(Expiry::Seconds(600).to_column(), Some(600));
        assert_eq!(Expiry::Never.to_column(), None);
    }

    #[test]
    fn test_expires_at_adds_lifetime_to_creation() {
        let created_at = Utc::now();
        let record = grant(Expiry::Seconds(600), created_at);

        assert_eq!(
            record.expires_at(),
            Some(created_at + Duration::seconds(600))
        );
        assert!(!record.is_expired_at(created_at + Duration::seconds(599)));
        assert!(record.is_expired_at(created_at + Duration::seconds(600)));
    }

    #[test]
    fn test_never_expiring_credential() {
        let record = grant(Expiry::Never, Utc::now() - Duration::days(3650));

        assert_eq!(record.expires_at(), None);
        assert!(!record.is_expired());
        assert!(record.is_accessible());
    }

    #[test]
    fn test_revocation_state() {
        let mut record = grant(Expiry::Never, Utc::now());
        assert!(!record.is_revoked());

        let revoked_at = Utc::now() - Duration::seconds(1);
        record.revoked_at = Some(revoked_at);

        assert!(record.is_revoked());
        assert!(!record.is_revoked_at(revoked_at - Duration::seconds(1)));
        assert!(!record.is_accessible());
    }

    #[test]
    fn test_expired_credential_is_not_accessible() {
        let record = grant(Expiry::Seconds(60), Utc::now() - Duration::seconds(120));

        assert!(record.is_expired());
        assert!(!record.is_accessible());
    }

    #[test]
    fn test_attribute_columns() {
        assert_eq!(TokenAttribute::Token.column(), "token");
        assert_eq!(TokenAttribute::RefreshToken.to_string(), "refresh_token");
        assert_eq!(CredentialKind::AccessGrant.table(), "access_grants");
        assert_eq!(CredentialKind::AccessToken.to_string(), "access_token");
    }
}
