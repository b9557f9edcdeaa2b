/// Receiver of "session is unrecoverable" signals.
///
/// The gateway calls this once per request that hits a 401 it cannot recover
/// from, so several concurrent callers may invoke it for the same failure.
/// Implementations must be idempotent: calling it twice has the same effect
/// as calling it once.
pub trait LogoutNotifier: Send + Sync {
    fn on_logout(&self);
}
