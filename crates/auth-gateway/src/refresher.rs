//! Refresh-endpoint contract.

use crate::error::RefreshError;
use crate::token_store::RefreshedTokens;
use async_trait::async_trait;

/// Exchanges a refresh token for a new access token.
///
/// The wire format belongs to the implementor; the gateway only cares whether
/// a usable access token came back.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, RefreshError>;
}
