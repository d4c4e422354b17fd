// ABOUTME: Runtime configuration for secret hashing
// ABOUTME: Builds the active strategy from the environment and supports atomic reloads

use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, PoisonError, RwLock};

use latchkey_config::{constants, env, ConfigError, ConfigResult};
use tracing::{info, warn};

use crate::hashing::{HashingStrategy, HmacSha256Digest, PlainText, Sha256Digest};

/// Algorithms selectable through `LATCHKEY_HASH_SECRETS`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    None,
    Sha256,
    HmacSha256,
}

impl HashAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            HashAlgorithm::None => "none",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::HmacSha256 => "hmac-sha256",
        }
    }
}

impl FromStr for HashAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "plain" | "off" => Ok(HashAlgorithm::None),
            "sha256" | "sha-256" => Ok(HashAlgorithm::Sha256),
            "hmac-sha256" | "hmac_sha256" => Ok(HashAlgorithm::HmacSha256),
            _ => Err(ConfigError::InvalidEnum(
                constants::LATCHKEY_HASH_SECRETS.to_string(),
                s.to_string(),
                "none, sha256, hmac-sha256".to_string(),
            )),
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One consistent view of the hashing settings
#[derive(Debug, Clone)]
pub struct HashingPolicy {
    strategy: Arc<dyn HashingStrategy>,
    fallback_to_plain: bool,
}

impl HashingPolicy {
    pub fn new(strategy: Arc<dyn HashingStrategy>, fallback_to_plain: bool) -> Self {
        Self {
            strategy,
            fallback_to_plain,
        }
    }

    /// Plaintext storage, the state of a store that never enabled hashing
    pub fn plain() -> Self {
        Self::new(Arc::new(PlainText), true)
    }

    pub fn strategy(&self) -> &Arc<dyn HashingStrategy> {
        &self.strategy
    }

    pub fn hashing_enabled(&self) -> bool {
        self.strategy.is_active()
    }

    /// Whether lookups retry with the raw value after a hashed miss
    pub fn fallback_to_plain(&self) -> bool {
        self.fallback_to_plain
    }

    /// Stored representation of `plaintext` for new writes and first lookups
    pub fn map(&self, plaintext: &str) -> String {
        self.strategy.map(plaintext)
    }

    /// Build a policy from variable lookups, failing on anything unusable
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let algorithm = match lookup(constants::LATCHKEY_HASH_SECRETS) {
            Some(raw) => raw.parse::<HashAlgorithm>()?,
            None => HashAlgorithm::None,
        };

        let strategy: Arc<dyn HashingStrategy> = match algorithm {
            HashAlgorithm::None => Arc::new(PlainText),
            HashAlgorithm::Sha256 => Arc::new(Sha256Digest),
            HashAlgorithm::HmacSha256 => {
                let key = lookup(constants::LATCHKEY_HASH_KEY).ok_or_else(|| {
                    ConfigError::Missing(constants::LATCHKEY_HASH_KEY.to_string())
                })?;
                Arc::new(HmacSha256Digest::new(key.as_bytes())?)
            }
        };

        let fallback_to_plain = match lookup(constants::LATCHKEY_FALLBACK_TO_PLAIN) {
            Some(raw) => env::parse_bool(constants::LATCHKEY_FALLBACK_TO_PLAIN, &raw)?,
            None => true,
        };

        if !strategy.is_active() {
            warn!("Secret hashing is disabled; new credentials will be stored in plaintext");
        } else {
            info!(
                "Secret hashing enabled with {} (plaintext fallback: {})",
                algorithm, fallback_to_plain
            );
        }

        Ok(Self::new(strategy, fallback_to_plain))
    }
}

/// The HMAC key is read verbatim; every other setting is trimmed
fn env_lookup(name: &str) -> Option<String> {
    if name == constants::LATCHKEY_HASH_KEY {
        env::raw_var(name)
    } else {
        env::var(name)
    }
}

/// Shared handle to the current hashing policy.
///
/// Every lookup and issuance takes a fresh [`HashingPolicy`] snapshot, so a
/// [`reload`](Self::reload) applies to the next call without a restart.
#[derive(Debug)]
pub struct SecretsConfig {
    current: RwLock<HashingPolicy>,
}

impl SecretsConfig {
    pub fn new(policy: HashingPolicy) -> Self {
        Self {
            current: RwLock::new(policy),
        }
    }

    pub fn plain() -> Self {
        Self::new(HashingPolicy::plain())
    }

    /// Hash with `strategy`, keeping the plaintext fallback for legacy rows
    pub fn with_strategy(strategy: Arc<dyn HashingStrategy>) -> Self {
        Self::new(HashingPolicy::new(strategy, true))
    }

    /// Load from `LATCHKEY_HASH_SECRETS`, `LATCHKEY_HASH_KEY` and
    /// `LATCHKEY_FALLBACK_TO_PLAIN`
    pub fn from_env() -> ConfigResult<Self> {
        HashingPolicy::from_lookup(env_lookup).map(Self::new)
    }

    pub fn snapshot(&self) -> HashingPolicy {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn hashing_enabled(&self) -> bool {
        self.snapshot().hashing_enabled()
    }

    pub fn current_strategy(&self) -> Arc<dyn HashingStrategy> {
        self.snapshot().strategy().clone()
    }

    /// Replace the policy; in-flight calls finish with the snapshot they took
    pub fn reload(&self, policy: HashingPolicy) {
        info!(
            "Reloading secret hashing policy: {} (plaintext fallback: {})",
            policy.strategy().name(),
            policy.fallback_to_plain()
        );
        *self.current.write().unwrap_or_else(PoisonError::into_inner) = policy;
    }
}

impl Default for SecretsConfig {
    fn default() -> Self {
        Self::plain()
    }
}
