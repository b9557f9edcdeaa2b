//! Token storage abstraction.

use crate::logout::LogoutNotifier;
use parking_lot::Mutex;

/// Access and refresh tokens held for the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
}

impl Credentials {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: Some(access_token.into()),
            refresh_token: Some(refresh_token.into()),
        }
    }

    /// Apply the result of a refresh started with `used_refresh_token`.
    ///
    /// Returns false and changes nothing when these credentials no longer
    /// hold that refresh token (signed out or replaced while refreshing).
    /// A missing refresh token in `tokens` keeps the current one.
    pub fn apply_refresh(&mut self, used_refresh_token: &str, tokens: &RefreshedTokens) -> bool {
        if self.refresh_token.as_deref() != Some(used_refresh_token) {
            return false;
        }
        self.access_token = Some(tokens.access_token.clone());
        if let Some(refresh_token) = &tokens.refresh_token {
            self.refresh_token = Some(refresh_token.clone());
        }
        true
    }
}

/// Tokens issued by a successful refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshedTokens {
    pub access_token: String,
    /// Rotated refresh token, when the backend issued one.
    pub refresh_token: Option<String>,
}

/// Owner of the current credentials.
///
/// The gateway only reads the refresh token and writes back tokens after a
/// successful refresh. Implementations must be safe to call from any task.
pub trait TokenStore: Send + Sync {
    /// Current access token, if signed in.
    fn access_token(&self) -> Option<String>;

    /// Current refresh token, if any.
    fn refresh_token(&self) -> Option<String>;

    /// Called with the new tokens once a refresh started with
    /// `used_refresh_token` succeeds.
    ///
    /// Must check and write atomically: if the store no longer holds
    /// `used_refresh_token`, leave it untouched and return false.
    fn on_tokens_updated(&self, used_refresh_token: &str, tokens: &RefreshedTokens) -> bool;
}

/// Process-local token store.
#[derive(Debug, Default)]
pub struct InMemoryTokenStore {
    credentials: Mutex<Credentials>,
}

impl InMemoryTokenStore {
    pub fn new(credentials: Credentials) -> Self {
        Self {
            credentials: Mutex::new(credentials),
        }
    }

    pub fn credentials(&self) -> Credentials {
        self.credentials.lock().clone()
    }

    pub fn set(&self, credentials: Credentials) {
        *self.credentials.lock() = credentials;
    }

    pub fn clear(&self) {
        *self.credentials.lock() = Credentials::default();
    }
}

impl TokenStore for InMemoryTokenStore {
    fn access_token(&self) -> Option<String> {
        self.credentials.lock().access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.credentials.lock().refresh_token.clone()
    }

    fn on_tokens_updated(&self, used_refresh_token: &str, tokens: &RefreshedTokens) -> bool {
        self.credentials.lock().apply_refresh(used_refresh_token, tokens)
    }
}

impl LogoutNotifier for InMemoryTokenStore {
    fn on_logout(&self) {
        self.clear();
    }
}
