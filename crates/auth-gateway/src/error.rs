//! Gateway error types.

use thiserror::Error;

/// Failure of the underlying HTTP transport.
///
/// These are the only failures the gateway reports as errors. HTTP-level
/// failures (4xx, 5xx) are returned as responses.
#[derive(Error, Debug)]
pub enum TransportError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Request did not complete in time
    #[error("Request timed out")]
    Timeout,

    /// Connection could not be established
    #[error("Connection failed: {0}")]
    Connection(String),
}

impl TransportError {
    /// Returns true if retrying the same call later could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            TransportError::Timeout | TransportError::Connection(_) => true,
            TransportError::Http(e) => e.is_connect() || e.is_timeout(),
        }
    }
}

/// Error returned by [`crate::AuthenticatedRequestGateway`].
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The original or retried request failed at the transport level
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The request could not be built (e.g. a token that is not a valid header value)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Reason a token refresh produced no new access token.
#[derive(Error, Debug)]
pub enum RefreshError {
    /// No refresh token was available
    #[error("No refresh token available")]
    MissingRefreshToken,

    /// The refresh endpoint answered with a non-success status
    #[error("Refresh rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },

    /// The refresh call failed at the transport level
    #[error("Refresh transport error: {0}")]
    Transport(#[from] TransportError),

    /// The refresh endpoint answered with an unusable body
    #[error("Invalid refresh response: {0}")]
    InvalidResponse(String),
}

/// Result type alias using GatewayError.
pub type GatewayResult<T> = Result<T, GatewayError>;
