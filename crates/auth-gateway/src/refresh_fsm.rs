//! Refresh state machine using rust-fsm.
//!
//! ```text
//! ┌──────────┐  RefreshStarted   ┌──────────────┐
//! │   Idle   │ ────────────────► │  Refreshing  │
//! └──────────┘ ◄──────────────── └──────────────┘
//!                RefreshSettled
//! ```
//!
//! `RefreshSettled` fires whatever the outcome (success, rejection or
//! timeout).

use rust_fsm::*;
use std::fmt;

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub refresh_machine(Idle)

    Idle => {
        RefreshStarted => Refreshing
    },
    Refreshing => {
        RefreshSettled => Idle
    }
}

pub use refresh_machine::Input as RefreshMachineInput;
pub use refresh_machine::State as RefreshMachineState;
pub use refresh_machine::StateMachine as RefreshMachine;

/// Observable refresh state of a gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// No refresh in flight.
    Idle,
    /// A refresh is in flight; new 401s join it.
    Refreshing,
}

impl From<&RefreshMachineState> for RefreshState {
    fn from(state: &RefreshMachineState) -> Self {
        match state {
            RefreshMachineState::Idle => RefreshState::Idle,
            RefreshMachineState::Refreshing => RefreshState::Refreshing,
        }
    }
}

impl fmt::Display for RefreshState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshState::Idle => write!(f, "idle"),
            RefreshState::Refreshing => write!(f, "refreshing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state_is_idle() {
        let machine = RefreshMachine::new();
        assert_eq!(RefreshState::from(machine.state()), RefreshState::Idle);
    }

    #[test]
    fn test_start_and_settle() {
        let mut machine = RefreshMachine::new();
        machine.consume(&RefreshMachineInput::RefreshStarted).unwrap();
        assert_eq!(machine.state(), &RefreshMachineState::Refreshing);
        machine.consume(&RefreshMachineInput::RefreshSettled).unwrap();
        assert_eq!(machine.state(), &RefreshMachineState::Idle);
    }

    #[test]
    fn test_cannot_start_twice() {
        let mut machine = RefreshMachine::new();
        machine.consume(&RefreshMachineInput::RefreshStarted).unwrap();
        assert!(machine.consume(&RefreshMachineInput::RefreshStarted).is_err());
    }

    #[test]
    fn test_cannot_settle_when_idle() {
        let mut machine = RefreshMachine::new();
        assert!(machine.consume(&RefreshMachineInput::RefreshSettled).is_err());
    }
}
