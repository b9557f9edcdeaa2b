//! # Auth Gateway
//!
//! Authenticated HTTP request gateway for the allowance client.
//!
//! Every outbound call that needs a bearer token goes through
//! [`AuthenticatedRequestGateway`]. The gateway attaches the access token,
//! detects `401 Unauthorized`, refreshes the token at most once across all
//! concurrent callers, retries the original request a single time and hands
//! unrecoverable failures to a [`LogoutNotifier`].
//!
//! ## Invariants
//!
//! - At most one refresh request is outstanding per gateway instance.
//! - Every caller waiting on a refresh observes the same outcome.
//! - The token store holds the new access token before any retry carrying it
//!   is issued.
//! - A retried request never re-enters the refresh path.
//! - Transport failures are surfaced to the caller and never retried.
//! - The refresher is never called when there is no refresh token and no
//!   refresh already in flight.
//! - A refresh result is stored only if the store still holds the refresh
//!   token it started from; a sign-out during the refresh stays signed out.
//! - The refresh slot returns to idle whatever the outcome, panics included.
//!
//! ## Collaborators
//!
//! All collaborators are injected at construction time:
//!
//! - [`HttpTransport`]: issues the HTTP call ([`ReqwestTransport`] in production)
//! - [`TokenStore`]: owns the access and refresh tokens
//! - [`TokenRefresher`]: exchanges a refresh token for new tokens
//! - [`LogoutNotifier`]: invoked when the session cannot be recovered

mod config;
mod error;
mod gateway;
mod logout;
mod refresh;
mod refresh_fsm;
mod refresher;
mod request;
mod token_store;
mod transport;

#[cfg(test)]
mod tests;

pub use config::{GatewayConfig, DEFAULT_REFRESH_TIMEOUT};
pub use error::{GatewayError, GatewayResult, RefreshError, TransportError};
pub use gateway::{AuthPath, AuthenticatedRequestGateway, GatewayResponse};
pub use logout::LogoutNotifier;
pub use refresh::RefreshOutcome;
pub use refresh_fsm::{RefreshMachine, RefreshMachineInput, RefreshMachineState, RefreshState};
pub use refresher::TokenRefresher;
pub use request::{ApiRequest, ApiResponse};
pub use token_store::{Credentials, InMemoryTokenStore, RefreshedTokens, TokenStore};
pub use transport::{HttpTransport, ReqwestTransport, TransportConfig};

/// Re-export of the HTTP vocabulary used in requests and responses.
pub use reqwest::{header, Method, StatusCode};
