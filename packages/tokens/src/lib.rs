// ABOUTME: Credential lookup core for Latchkey's OAuth token store
// ABOUTME: Resolves presented secrets across hashed and legacy plaintext rows, issues and revokes credentials

pub mod access_tokens;
pub mod error;
pub mod finder;
pub mod grants;
mod issuance;
pub mod resolver;
pub mod revocation;
pub mod store;
pub mod types;

// Re-export main types
pub use access_tokens::SqliteAccessTokenStore;
pub use error::{TokenError, TokenResult};
pub use finder::TokenFinder;
pub use grants::SqliteGrantStore;
pub use resolver::TokenResolver;
pub use revocation::RevocationManager;
pub use store::TokenStore;
pub use types::{
    AccessGrant, AccessToken, Credential, CredentialKind, Expiry, Issued, NewAccessGrant,
    NewAccessToken, SecretSource, TokenAttribute,
};
