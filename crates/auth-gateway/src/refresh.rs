//! Single-flight token refresh.
//!
//! The first caller to observe a 401 while a refresh token is available
//! starts the refresh. Everyone else who observes a 401 before it settles
//! awaits the same shared outcome. The refresh runs on its own task so it
//! settles even if every waiter is cancelled.

use crate::refresh_fsm::{RefreshMachine, RefreshMachineInput, RefreshState};
use crate::refresher::TokenRefresher;
use crate::token_store::TokenStore;
use futures_util::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Result of a refresh, shared by every caller that waited on it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// A new access token was issued and stored.
    Refreshed(String),
    /// No refresh token was available, so nothing was attempted.
    NoRefreshToken,
    /// The refresher failed or returned no usable token.
    Rejected(String),
    /// The refresher did not finish within the configured timeout.
    TimedOut,
    /// The refresh succeeded but the store was signed out or signed in again
    /// meanwhile, so the new tokens were discarded.
    Superseded,
}

impl RefreshOutcome {
    /// The new access token, if the refresh succeeded.
    pub fn access_token(&self) -> Option<&str> {
        match self {
            RefreshOutcome::Refreshed(token) => Some(token),
            _ => None,
        }
    }
}

type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

struct PendingRefresh {
    generation: u64,
    outcome: SharedRefresh,
}

struct RefreshSlot {
    pending: Option<PendingRefresh>,
    machine: RefreshMachine,
    next_generation: u64,
}

impl RefreshSlot {
    /// Clear the pending refresh if it is still `generation`.
    fn settle(&mut self, generation: u64) {
        if self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.generation == generation)
        {
            self.pending = None;
            self.transition(RefreshMachineInput::RefreshSettled);
        }
    }

    fn transition(&mut self, input: RefreshMachineInput) {
        let old_state = RefreshState::from(self.machine.state());
        match self.machine.consume(&input) {
            Ok(_) => debug!(
                old_state = %old_state,
                new_state = %RefreshState::from(self.machine.state()),
                "Refresh state transition"
            ),
            Err(_) => warn!(
                state = %old_state,
                input = ?input,
                "Ignored invalid refresh state transition"
            ),
        }
    }
}

/// Settles its generation when dropped, including when the refresher panics.
struct SettleGuard {
    slot: Arc<Mutex<RefreshSlot>>,
    generation: u64,
}

impl Drop for SettleGuard {
    fn drop(&mut self) {
        self.slot.lock().settle(self.generation);
    }
}

/// Owns the at-most-one pending refresh for a gateway instance.
#[derive(Clone)]
pub(crate) struct RefreshCoordinator {
    slot: Arc<Mutex<RefreshSlot>>,
    store: Arc<dyn TokenStore>,
    refresher: Arc<dyn TokenRefresher>,
    timeout: Duration,
}

impl RefreshCoordinator {
    pub(crate) fn new(
        store: Arc<dyn TokenStore>,
        refresher: Arc<dyn TokenRefresher>,
        timeout: Duration,
    ) -> Self {
        Self {
            slot: Arc::new(Mutex::new(RefreshSlot {
                pending: None,
                machine: RefreshMachine::new(),
                next_generation: 0,
            })),
            store,
            refresher,
            timeout,
        }
    }

    pub(crate) fn state(&self) -> RefreshState {
        RefreshState::from(self.slot.lock().machine.state())
    }

    /// Join the in-flight refresh, or start one if a refresh token exists.
    pub(crate) async fn refresh(&self) -> RefreshOutcome {
        let outcome = {
            let mut slot = self.slot.lock();
            match slot.pending.as_ref() {
                Some(pending) => {
                    debug!(generation = pending.generation, "Joining in-flight token refresh");
                    pending.outcome.clone()
                }
                None => {
                    let Some(refresh_token) = self.store.refresh_token() else {
                        debug!("No refresh token available, skipping refresh");
                        return RefreshOutcome::NoRefreshToken;
                    };

                    let generation = slot.next_generation;
                    slot.next_generation += 1;

                    // The slot lock is held until `pending` is set, so the task
                    // cannot settle before it is registered.
                    let task = tokio::spawn(self.clone().run(generation, refresh_token));
                    let outcome = async move {
                        task.await.unwrap_or_else(|e| {
                            RefreshOutcome::Rejected(format!("refresh task failed: {}", e))
                        })
                    }
                    .boxed()
                    .shared();

                    slot.pending = Some(PendingRefresh {
                        generation,
                        outcome: outcome.clone(),
                    });
                    slot.transition(RefreshMachineInput::RefreshStarted);
                    outcome
                }
            }
        };
        outcome.await
    }

    async fn run(self, generation: u64, refresh_token: String) -> RefreshOutcome {
        let guard = SettleGuard {
            slot: self.slot.clone(),
            generation,
        };
        info!(generation, "Refreshing access token");

        let result = tokio::time::timeout(self.timeout, self.refresher.refresh(&refresh_token)).await;
        let outcome = match result {
            Ok(Ok(tokens)) if tokens.access_token.is_empty() => {
                warn!(generation, "Refresh returned an empty access token");
                RefreshOutcome::Rejected("empty access token".to_string())
            }
            // Stored before any waiter can retry with the new token.
            Ok(Ok(tokens)) if self.store.on_tokens_updated(&refresh_token, &tokens) => {
                info!(
                    generation,
                    rotated = tokens.refresh_token.is_some(),
                    "Access token refreshed"
                );
                RefreshOutcome::Refreshed(tokens.access_token)
            }
            Ok(Ok(_)) => {
                info!(generation, "Session changed during refresh, discarding new tokens");
                RefreshOutcome::Superseded
            }
            Ok(Err(e)) => {
                warn!(generation, error = %e, "Token refresh failed");
                RefreshOutcome::Rejected(e.to_string())
            }
            Err(_) => {
                warn!(
                    generation,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Token refresh timed out"
                );
                RefreshOutcome::TimedOut
            }
        };

        drop(guard);
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_token_only_on_success() {
        assert_eq!(
            RefreshOutcome::Refreshed("T2".into()).access_token(),
            Some("T2")
        );
        assert_eq!(RefreshOutcome::NoRefreshToken.access_token(), None);
        assert_eq!(RefreshOutcome::TimedOut.access_token(), None);
        assert_eq!(RefreshOutcome::Superseded.access_token(), None);
        assert_eq!(RefreshOutcome::Rejected("400".into()).access_token(), None);
    }
}
