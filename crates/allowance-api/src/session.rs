//! In-memory session: the token store and logout notifier for the gateway.
//!
//! Nothing is persisted. A session is signed in from an [`AuthResponse`] (or
//! from tokens handed over by the caller) and signed out either explicitly or
//! by the gateway when the refresh token can no longer be used.

use crate::models::{AuthResponse, Role};
use auth_gateway::{Credentials, LogoutNotifier, RefreshedTokens, TokenStore};
use parking_lot::Mutex;
use tracing::{debug, info};

/// Whether the session currently holds credentials.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    SignedOut,
    SignedIn,
}

/// Who is signed in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionUser {
    pub user_id: String,
    pub email: String,
    pub full_name: String,
    pub role: Option<Role>,
}

/// Callback type for session state change notifications.
pub type SessionStateCallback = Box<dyn Fn(SessionState) + Send + Sync>;

#[derive(Default)]
struct SessionData {
    credentials: Credentials,
    user: Option<SessionUser>,
}

impl SessionData {
    fn state(&self) -> SessionState {
        if self.credentials.access_token.is_some() || self.credentials.refresh_token.is_some() {
            SessionState::SignedIn
        } else {
            SessionState::SignedOut
        }
    }
}

/// Session shared between the client and its gateway.
#[derive(Default)]
pub struct Session {
    data: Mutex<SessionData>,
    state_callback: Mutex<Option<SessionStateCallback>>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session resumed from tokens obtained elsewhere.
    pub fn with_tokens(access_token: Option<String>, refresh_token: Option<String>) -> Self {
        let session = Self::new();
        session.data.lock().credentials = Credentials {
            access_token,
            refresh_token,
        };
        session
    }

    /// Register a callback invoked on every sign-in and sign-out transition.
    pub fn set_state_callback(&self, callback: SessionStateCallback) {
        *self.state_callback.lock() = Some(callback);
    }

    /// Store the credentials and user from a login or registration.
    pub fn sign_in(&self, auth: &AuthResponse) {
        let previous = {
            let mut data = self.data.lock();
            let previous = data.state();
            data.credentials = Credentials {
                access_token: Some(auth.token.clone()),
                refresh_token: auth.refresh_token.clone(),
            };
            data.user = Some(SessionUser {
                user_id: auth.user_id.clone(),
                email: auth.email.clone(),
                full_name: auth.full_name.clone(),
                role: auth.role(),
            });
            previous
        };
        info!(user_id = %auth.user_id, role = %auth.role, "Signed in");
        if previous == SessionState::SignedOut {
            self.notify(SessionState::SignedIn);
        }
    }

    /// Clear credentials and user. Returns true if the session was signed in.
    ///
    /// Signing out an already signed-out session does nothing.
    pub fn sign_out(&self) -> bool {
        let was_signed_in = {
            let mut data = self.data.lock();
            let was_signed_in = data.state() == SessionState::SignedIn;
            *data = SessionData::default();
            was_signed_in
        };
        if was_signed_in {
            info!("Signed out");
            self.notify(SessionState::SignedOut);
        } else {
            debug!("Sign out requested while already signed out");
        }
        was_signed_in
    }

    pub fn state(&self) -> SessionState {
        self.data.lock().state()
    }

    pub fn user(&self) -> Option<SessionUser> {
        self.data.lock().user.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.data.lock().user.as_ref().and_then(|user| user.role)
    }

    pub fn credentials(&self) -> Credentials {
        self.data.lock().credentials.clone()
    }

    fn notify(&self, state: SessionState) {
        if let Some(callback) = self.state_callback.lock().as_ref() {
            callback(state);
        }
    }
}

impl TokenStore for Session {
    fn access_token(&self) -> Option<String> {
        self.data.lock().credentials.access_token.clone()
    }

    fn refresh_token(&self) -> Option<String> {
        self.data.lock().credentials.refresh_token.clone()
    }

    fn on_tokens_updated(&self, used_refresh_token: &str, tokens: &RefreshedTokens) -> bool {
        let applied = self
            .data
            .lock()
            .credentials
            .apply_refresh(used_refresh_token, tokens);
        if applied {
            debug!(rotated = tokens.refresh_token.is_some(), "Session tokens updated");
        } else {
            debug!("Session changed during refresh, tokens discarded");
        }
        applied
    }
}

impl LogoutNotifier for Session {
    fn on_logout(&self) {
        self.sign_out();
    }
}
