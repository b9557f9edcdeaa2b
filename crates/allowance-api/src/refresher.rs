//! Refresh-token exchange against `POST /api/Auth/refresh`.

use crate::endpoints::Endpoints;
use crate::models::{AuthResponse, RefreshTokenRequest};
use crate::response::{classify, summarize_body, ResponseBody};
use async_trait::async_trait;
use auth_gateway::{ApiRequest, HttpTransport, RefreshError, RefreshedTokens, TokenRefresher};
use std::sync::Arc;
use tracing::{debug, warn};

/// Exchanges refresh tokens with the backend.
///
/// Calls the transport directly so a refresh never passes back through the
/// gateway's 401 handling.
pub struct BackendTokenRefresher {
    transport: Arc<dyn HttpTransport>,
    endpoints: Endpoints,
}

impl BackendTokenRefresher {
    pub fn new(transport: Arc<dyn HttpTransport>, endpoints: Endpoints) -> Self {
        Self {
            transport,
            endpoints,
        }
    }
}

#[async_trait]
impl TokenRefresher for BackendTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<RefreshedTokens, RefreshError> {
        if refresh_token.is_empty() {
            return Err(RefreshError::MissingRefreshToken);
        }

        let body = serde_json::to_string(&RefreshTokenRequest {
            refresh_token: refresh_token.to_string(),
        })
        .map_err(|e| RefreshError::InvalidResponse(e.to_string()))?;
        let request = ApiRequest::post(self.endpoints.refresh()).with_json_body(body);

        let response = self.transport.send(request).await?;
        let parsed = classify(&response, Some("Token refresh failed")).map_err(|failure| {
            warn!(
                status = failure.status,
                body_summary = %summarize_body(&failure.raw_body),
                "Refresh endpoint rejected the refresh token"
            );
            RefreshError::Rejected {
                status: failure.status,
                message: failure.parsed_message,
            }
        })?;

        let auth: AuthResponse = match parsed {
            ResponseBody::Json(value) => serde_json::from_value(value)
                .map_err(|e| RefreshError::InvalidResponse(e.to_string()))?,
            _ => {
                return Err(RefreshError::InvalidResponse(
                    "refresh response is not JSON".into(),
                ))
            }
        };
        if auth.token.is_empty() {
            return Err(RefreshError::InvalidResponse("refresh response has no token".into()));
        }

        debug!(user_id = %auth.user_id, rotated = auth.refresh_token.is_some(), "Refresh endpoint issued new tokens");
        Ok(RefreshedTokens {
            access_token: auth.token,
            refresh_token: auth.refresh_token.filter(|token| !token.is_empty()),
        })
    }
}
