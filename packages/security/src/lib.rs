// ABOUTME: Secret hashing and generation for Latchkey
// ABOUTME: Pluggable one-way strategies plus the runtime-reloadable hashing configuration

pub mod config;
pub mod hashing;
pub mod secrets;

// Re-export main types for convenience
pub use config::{HashAlgorithm, HashingPolicy, SecretsConfig};
pub use hashing::{verify, HashingStrategy, HmacSha256Digest, PlainText, Sha256Digest};
pub use secrets::generate_secret;
