//! Behavioural tests for the authenticated request gateway.
//!
//! - `harness.rs`     - Scripted transport, refresher, token store and logout notifier
//! - `single_flight.rs` - Concurrent 401s share one refresh
//! - `retry.rs`       - Single retry, header handling, non-401 and transport failures
//! - `logout.rs`      - Logout escalation and refresh-token availability
//! - `timeout.rs`     - Hung refreshers and state recovery
//! - `recovery.rs`    - Panicking refreshers
//! - `session_change.rs` - Sign-out or sign-in while a refresh is in flight

mod single_flight;
