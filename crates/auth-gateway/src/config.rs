//! Gateway configuration.

use std::time::Duration;

/// Default upper bound on a single token refresh.
pub const DEFAULT_REFRESH_TIMEOUT: Duration = Duration::from_secs(10);

/// Configuration for [`crate::AuthenticatedRequestGateway`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// How long a refresh may run before it is treated as failed.
    pub refresh_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            refresh_timeout: DEFAULT_REFRESH_TIMEOUT,
        }
    }
}

impl GatewayConfig {
    /// Set the refresh timeout.
    pub fn with_refresh_timeout(mut self, timeout: Duration) -> Self {
        self.refresh_timeout = timeout;
        self
    }
}
