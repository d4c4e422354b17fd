// ABOUTME: Hashing strategies mapping plaintext secrets to their stored form
// ABOUTME: Identity, SHA-256, and keyed HMAC-SHA256 implementations with constant-time verification

use std::fmt;

use hmac::{Hmac, Mac};
use latchkey_config::ConfigError;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Maps a presented plaintext secret to the representation kept in storage.
///
/// Implementations must be deterministic and total. Active strategies must be
/// one-way: nothing in Latchkey ever asks for the inverse.
pub trait HashingStrategy: Send + Sync + fmt::Debug {
    /// Short identifier used in logs and configuration
    fn name(&self) -> &'static str;

    /// Whether stored values differ from the plaintext
    fn is_active(&self) -> bool {
        true
    }

    fn map(&self, plaintext: &str) -> String;
}

/// No hashing: the stored value is the secret itself
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainText;

impl HashingStrategy for PlainText {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_active(&self) -> bool {
        false
    }

    fn map(&self, plaintext: &str) -> String {
        plaintext.to_string()
    }
}

/// Lowercase hex SHA-256 of the UTF-8 bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha256Digest;

impl HashingStrategy for Sha256Digest {
    fn name(&self) -> &'static str {
        "sha256"
    }

    fn map(&self, plaintext: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(plaintext.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Lowercase hex HMAC-SHA256 keyed with a server-side pepper
///
/// A leaked table cannot be brute-forced offline without the key.
#[derive(Clone)]
pub struct HmacSha256Digest {
    mac: Hmac<Sha256>,
}

impl HmacSha256Digest {
    pub fn new(key: &[u8]) -> Result<Self, ConfigError> {
        if key.is_empty() {
            return Err(ConfigError::Invalid(
                "HMAC secret hashing requires a non-empty key".to_string(),
            ));
        }

        let mac = Hmac::<Sha256>::new_from_slice(key)
            .map_err(|e| ConfigError::Invalid(format!("Unusable HMAC key: {}", e)))?;
        Ok(Self { mac })
    }
}

impl fmt::Debug for HmacSha256Digest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HmacSha256Digest")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl HashingStrategy for HmacSha256Digest {
    fn name(&self) -> &'static str {
        "hmac-sha256"
    }

    fn map(&self, plaintext: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(plaintext.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }
}

/// Compare a presented secret with a stored value in constant time
pub fn verify(strategy: &dyn HashingStrategy, plaintext: &str, stored: &str) -> bool {
    let mapped = strategy.map(plaintext);
    mapped.as_bytes().ct_eq(stored.as_bytes()).into()
}
