//! The authenticated request gateway.

use crate::config::GatewayConfig;
use crate::error::{GatewayError, GatewayResult};
use crate::logout::LogoutNotifier;
use crate::refresh::{RefreshCoordinator, RefreshOutcome};
use crate::refresh_fsm::RefreshState;
use crate::refresher::TokenRefresher;
use crate::request::{ApiRequest, ApiResponse};
use crate::token_store::TokenStore;
use crate::transport::HttpTransport;
use reqwest::header::{HeaderValue, AUTHORIZATION};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Which path through the gateway produced a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPath {
    /// The first attempt's response, returned as is.
    FirstAttempt,
    /// The response of the single retry after a successful refresh.
    RetriedAfterRefresh,
    /// The original 401; no new token could be obtained. Logout was signalled
    /// unless the session had already changed during the refresh.
    RefreshUnavailable,
}

/// Response returned by the gateway together with the path that produced it.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub response: ApiResponse,
    pub auth: AuthPath,
}

impl GatewayResponse {
    fn new(response: ApiResponse, auth: AuthPath) -> Self {
        Self { response, auth }
    }

    pub fn into_response(self) -> ApiResponse {
        self.response
    }
}

/// Sends authenticated requests, refreshing the access token on 401.
///
/// Collaborators are injected at construction. Each gateway owns its own
/// refresh slot, so separate gateways never share a pending refresh.
pub struct AuthenticatedRequestGateway {
    transport: Arc<dyn HttpTransport>,
    store: Arc<dyn TokenStore>,
    logout: Arc<dyn LogoutNotifier>,
    refresh: RefreshCoordinator,
}

impl AuthenticatedRequestGateway {
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        store: Arc<dyn TokenStore>,
        refresher: Arc<dyn TokenRefresher>,
        logout: Arc<dyn LogoutNotifier>,
        config: GatewayConfig,
    ) -> Self {
        let refresh = RefreshCoordinator::new(store.clone(), refresher, config.refresh_timeout);
        Self {
            transport,
            store,
            logout,
            refresh,
        }
    }

    /// Send `request` with the store's current access token, retrying once on 401.
    pub async fn send(&self, request: &ApiRequest) -> GatewayResult<GatewayResponse> {
        let token = self.store.access_token();
        self.send_authenticated(request, token.as_deref(), true).await
    }

    /// Send `request` with `token` as the bearer credential.
    ///
    /// On a 401 with `allow_retry` set, the token is refreshed (or an in-flight
    /// refresh is joined) and the request is re-issued exactly once with the
    /// new token. The retry's response is returned whatever its status. When
    /// no new token can be obtained, the logout notifier is invoked and the
    /// original 401 is returned. If the store was signed out or re-signed in
    /// while the refresh ran, its result is discarded and the original 401 is
    /// returned without signalling logout.
    ///
    /// Transport failures of either attempt are returned as errors and are not
    /// retried.
    pub async fn send_authenticated(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
        allow_retry: bool,
    ) -> GatewayResult<GatewayResponse> {
        let response = self.dispatch(request, token).await?;
        if !response.is_unauthorized() || !allow_retry {
            return Ok(GatewayResponse::new(response, AuthPath::FirstAttempt));
        }

        debug!(method = %request.method, url = %request.url, "Unauthorized, refreshing access token");

        match self.refresh.refresh().await {
            RefreshOutcome::Refreshed(new_token) => {
                let retried = self.dispatch(request, Some(&new_token)).await?;
                if retried.is_unauthorized() {
                    warn!(
                        method = %request.method,
                        url = %request.url,
                        "Still unauthorized after token refresh"
                    );
                }
                Ok(GatewayResponse::new(retried, AuthPath::RetriedAfterRefresh))
            }
            RefreshOutcome::Superseded => {
                // The session was ended or replaced while refreshing; no logout.
                debug!(
                    method = %request.method,
                    url = %request.url,
                    "Session changed during refresh, returning original response"
                );
                Ok(GatewayResponse::new(response, AuthPath::RefreshUnavailable))
            }
            outcome => {
                info!(
                    method = %request.method,
                    url = %request.url,
                    outcome = ?outcome,
                    "No access token after refresh, signalling logout"
                );
                self.logout.on_logout();
                Ok(GatewayResponse::new(response, AuthPath::RefreshUnavailable))
            }
        }
    }

    /// Current refresh state of this gateway.
    pub fn refresh_state(&self) -> RefreshState {
        self.refresh.state()
    }

    pub fn token_store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    async fn dispatch(&self, request: &ApiRequest, token: Option<&str>) -> GatewayResult<ApiResponse> {
        let mut attempt = request.clone();
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| GatewayError::InvalidRequest("access token is not a valid header value".into()))?;
            value.set_sensitive(true);
            attempt.headers.insert(AUTHORIZATION, value);
        }

        let response = self.transport.send(attempt).await?;
        debug!(
            method = %request.method,
            url = %request.url,
            status = response.status.as_u16(),
            authenticated = token.is_some(),
            "Request completed"
        );
        Ok(response)
    }
}
