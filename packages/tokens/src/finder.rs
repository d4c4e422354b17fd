// ABOUTME: Point-lookup interface implemented by each credential store
// ABOUTME: The resolver is generic over it, so lookups can be mocked and counted

use async_trait::async_trait;

use crate::error::TokenResult;
use crate::types::{Credential, TokenAttribute};

/// Exact, case-sensitive lookup of a single credential by a token column
#[async_trait]
pub trait TokenFinder: Send + Sync {
    type Record: Credential + Send;

    /// `Ok(None)` when no record holds `value` in `attribute`
    async fn find_one_by(
        &self,
        attribute: TokenAttribute,
        value: &str,
    ) -> TokenResult<Option<Self::Record>>;
}
