// ABOUTME: Resolves presented plaintext credentials to stored records
// ABOUTME: Hashed lookup first, then the raw value for rows written before hashing was enabled

use std::sync::Arc;

use latchkey_security::SecretsConfig;
use tracing::debug;

use crate::error::TokenResult;
use crate::finder::TokenFinder;
use crate::types::{Credential, TokenAttribute};

/// Ordered, fallback-aware lookup over a [`TokenFinder`].
///
/// The hashing policy is read from the shared [`SecretsConfig`] on every
/// call. With hashing disabled exactly one lookup is made with the presented
/// value. With hashing enabled the mapped value is looked up first and, only
/// when that misses, the presented value itself. The two lookups are never
/// merged, and a hashed hit always wins.
pub struct TokenResolver<F> {
    finder: F,
    secrets: Arc<SecretsConfig>,
}

impl<F: TokenFinder> TokenResolver<F> {
    pub fn new(finder: F, secrets: Arc<SecretsConfig>) -> Self {
        Self { finder, secrets }
    }

    pub async fn resolve(
        &self,
        attribute: TokenAttribute,
        presented: &str,
    ) -> TokenResult<Option<F::Record>> {
        let policy = self.secrets.snapshot();

        if !policy.hashing_enabled() {
            return self.finder.find_one_by(attribute, presented).await;
        }

        let mapped = policy.map(presented);
        if let Some(record) = self.finder.find_one_by(attribute, &mapped).await? {
            return Ok(Some(record));
        }

        if !policy.fallback_to_plain() {
            return Ok(None);
        }

        let legacy = self.finder.find_one_by(attribute, presented).await?;
        if let Some(record) = &legacy {
            debug!(
                "Resolved {} of record {} through its plaintext value",
                attribute,
                record.id()
            );
        }

        Ok(legacy)
    }

    pub async fn by_token(&self, presented: &str) -> TokenResult<Option<F::Record>> {
        self.resolve(TokenAttribute::Token, presented).await
    }

    pub async fn by_refresh_token(&self, presented: &str) -> TokenResult<Option<F::Record>> {
        self.resolve(TokenAttribute::RefreshToken, presented).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TokenError;
    use crate::types::{AccessGrant, CredentialKind, Expiry};
    use chrono::Utc;
    use latchkey_security::{HashingPolicy, HashingStrategy, Sha256Digest};
    use latchkey_storage::StorageError;
    use mockall::{mock, Sequence};

    mock! {
        Finder {}

        #[async_trait::async_trait]
        impl TokenFinder for Finder {
            type Record = AccessGrant;

            async fn find_one_by(
                &self,
                attribute: TokenAttribute,
                value: &str,
            ) -> TokenResult<Option<AccessGrant>>;
        }
    }

    fn grant_with(token: &str) -> AccessGrant {
        AccessGrant {
            id: format!("grant-{}", token.len()),
            resource_owner_id: 100,
            application_id: 1,
            token: token.to_string(),
            expires_in: Expiry::Seconds(600),
            redirect_uri: "https://app.example.com/callback".to_string(),
            created_at: Utc::now(),
            revoked_at: None,
        }
    }

    fn sha256_config() -> Arc<SecretsConfig> {
        Arc::new(SecretsConfig::with_strategy(Arc::new(Sha256Digest)))
    }

    #[tokio::test]
    async fn test_disabled_hashing_makes_exactly_one_plain_lookup() {
        let mut finder = MockFinder::new();
        finder
            .expect_find_one_by()
            .withf(|attribute, value| *attribute == TokenAttribute::Token && value == "asdf")
            .times(1)
            .returning(|_, _| Ok(None));

        let resolver = TokenResolver::new(finder, Arc::new(SecretsConfig::plain()));

        assert!(resolver.by_token("asdf").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_disabled_hashing_returns_plain_match() {
        let mut finder = MockFinder::new();
        finder
            .expect_find_one_by()
            .times(1)
            .returning(|_, value| Ok(Some(grant_with(value))));

        let resolver = TokenResolver::new(finder, Arc::new(SecretsConfig::plain()));
        let found = resolver.by_token("tok-abc").await.unwrap().unwrap();

        assert_eq!(found.token, "tok-abc");
    }

    #[tokio::test]
    async fn test_hashed_hit_skips_plain_lookup() {
        let hashed = Sha256Digest.map("asdf");

        let mut finder = MockFinder::new();
        let expected = hashed.clone();
        finder
            .expect_find_one_by()
            .withf(move |_, value| value == expected)
            .times(1)
            .returning(|_, value| Ok(Some(grant_with(value))));
        finder
            .expect_find_one_by()
            .withf(|_, value| value == "asdf")
            .never();

        let resolver = TokenResolver::new(finder, sha256_config());
        let found = resolver.by_token("asdf").await.unwrap().unwrap();

        assert_eq!(found.token, hashed);
    }

    #[tokio::test]
    async fn test_hashed_miss_falls_back_to_plain_value() {
        let hashed = Sha256Digest.map("asdf");
        let mut seq = Sequence::new();

        let mut finder = MockFinder::new();
        finder
            .expect_find_one_by()
            .withf(move |_, value| value == hashed)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));
        finder
            .expect_find_one_by()
            .withf(|_, value| value == "asdf")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, value| Ok(Some(grant_with(value))));

        let resolver = TokenResolver::new(finder, sha256_config());
        let found = resolver.by_token("asdf").await.unwrap().unwrap();

        assert_eq!(found.token, "asdf");
    }

    #[tokio::test]
    async fn test_double_miss_issues_two_lookups_and_returns_none() {
        let hashed = Sha256Digest.map("nothing-here");
        let mut seq = Sequence::new();

        let mut finder = MockFinder::new();
        finder
            .expect_find_one_by()
            .withf(move |_, value| value == hashed)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));
        finder
            .expect_find_one_by()
            .withf(|_, value| value == "nothing-here")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));

        let resolver = TokenResolver::new(finder, sha256_config());

        assert!(resolver.by_token("nothing-here").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_fallback_disabled_stops_after_hashed_miss() {
        let policy = HashingPolicy::new(Arc::new(Sha256Digest), false);

        let mut finder = MockFinder::new();
        finder
            .expect_find_one_by()
            .times(1)
            .returning(|_, _| Ok(None));

        let resolver = TokenResolver::new(finder, Arc::new(SecretsConfig::new(policy)));

        assert!(resolver.by_token("legacy-plain").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_resolve_passes_attribute_through() {
        let mut finder = MockFinder::new();
        finder
            .expect_find_one_by()
            .withf(|attribute, _| *attribute == TokenAttribute::RefreshToken)
            .times(2)
            .returning(|_, _| Ok(None));

        let resolver = TokenResolver::new(finder, sha256_config());

        assert!(resolver.by_refresh_token("r-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_storage_fault_on_first_lookup_propagates() {
        let mut finder = MockFinder::new();
        finder
            .expect_find_one_by()
            .times(1)
            .returning(|_, _| {
                Err(TokenError::Storage(StorageError::Database(
                    "connection refused".to_string(),
                )))
            });

        let resolver = TokenResolver::new(finder, sha256_config());
        let err = resolver.by_token("asdf").await.unwrap_err();

        assert!(matches!(err, TokenError::Storage(_)));
    }

    #[tokio::test]
    async fn test_unsupported_attribute_error_propagates() {
        let mut finder = MockFinder::new();
        finder.expect_find_one_by().times(1).returning(|attribute, _| {
            Err(TokenError::UnsupportedAttribute {
                kind: CredentialKind::AccessGrant,
                attribute,
            })
        });

        let resolver = TokenResolver::new(finder, Arc::new(SecretsConfig::plain()));
        let err = resolver.by_refresh_token("asdf").await.unwrap_err();

        assert!(matches!(err, TokenError::UnsupportedAttribute { .. }));
    }

    #[tokio::test]
    async fn test_reload_takes_effect_on_next_call() {
        let secrets = Arc::new(SecretsConfig::plain());
        let hashed = Sha256Digest.map("asdf");
        let mut seq = Sequence::new();

        let mut finder = MockFinder::new();
        finder
            .expect_find_one_by()
            .withf(|_, value| value == "asdf")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(None));
        finder
            .expect_find_one_by()
            .withf(move |_, value| value == hashed)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, value| Ok(Some(grant_with(value))));

        let resolver = TokenResolver::new(finder, secrets.clone());
        assert!(resolver.by_token("asdf").await.unwrap().is_none());

        secrets.reload(HashingPolicy::new(Arc::new(Sha256Digest), true));
        assert!(resolver.by_token("asdf").await.unwrap().is_some());
    }
}
