// ABOUTME: Validation and secret mapping shared by every credential store
// ABOUTME: Required-field checks and the rule that hashed stores never persist plaintext

use latchkey_config::ConfigError;
use latchkey_security::{generate_secret, verify, HashingPolicy, PlainText};
use secrecy::{ExposeSecret, SecretString};

use crate::error::{TokenError, TokenResult};
use crate::types::{Expiry, SecretSource};

/// Fields every credential must carry
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ownership {
    pub resource_owner_id: i64,
    pub application_id: i64,
    pub expires_in: Expiry,
}

pub(crate) fn require_ownership(
    resource_owner_id: Option<i64>,
    application_id: Option<i64>,
    expires_in: Option<Expiry>,
) -> TokenResult<Ownership> {
    let resource_owner_id = resource_owner_id
        .ok_or_else(|| TokenError::Validation("resource_owner_id is required".to_string()))?;
    let application_id = application_id
        .ok_or_else(|| TokenError::Validation("application_id is required".to_string()))?;
    let expires_in = expires_in
        .ok_or_else(|| TokenError::Validation("expires_in is required".to_string()))?;

    if let Expiry::Seconds(seconds) = expires_in {
        if seconds < 0 {
            return Err(TokenError::Validation(format!(
                "expires_in must not be negative, got {}",
                seconds
            )));
        }
    }

    Ok(Ownership {
        resource_owner_id,
        application_id,
        expires_in,
    })
}

pub(crate) fn plaintext_from(source: SecretSource) -> TokenResult<SecretString> {
    let plaintext = match source {
        SecretSource::Generate => generate_secret(),
        SecretSource::Provided(secret) => secret,
    };

    if plaintext.expose_secret().is_empty() {
        return Err(TokenError::Validation("token is required".to_string()));
    }

    Ok(plaintext)
}

/// Map `plaintext` to the value written to storage.
///
/// With hashing enabled a strategy that hands back its input unchanged is
/// treated as misconfigured rather than silently storing the plaintext.
pub(crate) fn stored_value(
    policy: &HashingPolicy,
    plaintext: &SecretString,
) -> TokenResult<String> {
    let plaintext = plaintext.expose_secret();
    let mapped = policy.map(plaintext);

    if policy.hashing_enabled() && verify(&PlainText, plaintext, &mapped) {
        return Err(TokenError::Configuration(ConfigError::Invalid(format!(
            "hashing strategy '{}' returned the plaintext unchanged",
            policy.strategy().name()
        ))));
    }

    if mapped.is_empty() {
        return Err(TokenError::Validation("token is required".to_string()));
    }

    Ok(mapped)
}
