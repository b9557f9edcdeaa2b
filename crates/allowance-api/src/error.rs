//! Error types for backend operations.

use crate::response::HttpFailure;
use auth_gateway::{GatewayError, TransportError};
use thiserror::Error;

/// Failure of a backend operation, as surfaced to callers.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never completed; not retried
    #[error("Network error: {0}")]
    Network(#[from] TransportError),

    /// No usable refresh token or the refresh failed; the session was logged out
    #[error("Session expired, please sign in again")]
    AuthExpired,

    /// Still unauthorized after a successful refresh and retry
    #[error("Still unauthorized after refreshing the session")]
    RetryExhausted,

    /// Any other non-success response
    #[error("{0}")]
    Operation(HttpFailure),

    /// Input rejected before any request was sent
    #[error("Invalid input: {0}")]
    Validation(String),

    /// The request could not be built
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A success response whose body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL parse error
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Transport(e) => ApiError::Network(e),
            GatewayError::InvalidRequest(msg) => ApiError::InvalidRequest(msg),
        }
    }
}

impl ApiError {
    /// Returns true if the operation may succeed when tried again later.
    pub fn is_transient(&self) -> bool {
        match self {
            ApiError::Network(e) => e.is_transient(),
            ApiError::Operation(failure) => failure.status >= 500 || failure.status == 429,
            _ => false,
        }
    }

    /// Returns true if the user must sign in again.
    pub fn requires_sign_in(&self) -> bool {
        matches!(self, ApiError::AuthExpired | ApiError::RetryExhausted)
    }

    /// HTTP status of the failure, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Operation(failure) => Some(failure.status),
            ApiError::AuthExpired | ApiError::RetryExhausted => Some(401),
            _ => None,
        }
    }
}

/// Result type alias using ApiError.
pub type ApiResult<T> = Result<T, ApiError>;
