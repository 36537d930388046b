//! Push lifecycle state machine.
//!
//! ```text
//! Uninitialized ──CheckPermission──► PermissionRequested
//!       │                              │ PermissionGranted ─► Granted
//!       │ PlatformUnsupported          │ PermissionDenied ──► Denied
//!       ▼                              │ PlatformUnsupported► Unsupported
//!  Unsupported                         ▼
//!                     Granted ──TokenIssued──► TokenAcquired ──BackendRegistered──► Registered
//!                        │                          │                                  │
//!                        │ TokenUnavailable         └────────StartListening───────┐    │ StartListening
//!                        ▼                                                        ▼    ▼
//!                     Degraded                                                   Listening
//! ```
//!
//! `TearDown` returns every state to `Uninitialized`.

use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub push_machine(Uninitialized)

    Uninitialized => {
        CheckPermission => PermissionRequested,
        PlatformUnsupported => Unsupported,
        TearDown => Uninitialized
    },
    PermissionRequested => {
        PermissionGranted => Granted,
        PermissionDenied => Denied,
        PlatformUnsupported => Unsupported,
        TearDown => Uninitialized
    },
    Granted => {
        TokenIssued => TokenAcquired,
        TokenUnavailable => Degraded,
        TearDown => Uninitialized
    },
    TokenAcquired => {
        BackendRegistered => Registered,
        StartListening => Listening,
        TearDown => Uninitialized
    },
    Registered => {
        StartListening => Listening,
        TearDown => Uninitialized
    },
    Listening => {
        TearDown => Uninitialized
    },
    Denied => {
        TearDown => Uninitialized
    },
    Unsupported => {
        TearDown => Uninitialized
    },
    Degraded => {
        TearDown => Uninitialized
    }
}

pub use push_machine::Input as PushMachineInput;
pub use push_machine::State as PushMachineState;
pub use push_machine::StateMachine as PushMachine;

/// Push lifecycle state for display and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PushState {
    Uninitialized,
    PermissionRequested,
    Granted,
    Denied,
    Unsupported,
    TokenAcquired,
    Registered,
    Listening,
    /// Permission granted but no token; in-app notifications only.
    Degraded,
}

impl PushState {
    /// Initialization ran to an end state and will not continue on its own.
    pub fn is_settled(&self) -> bool {
        !matches!(
            self,
            PushState::Uninitialized | PushState::PermissionRequested | PushState::Granted
        )
    }

    /// A token exists for this session.
    pub fn has_token(&self) -> bool {
        matches!(
            self,
            PushState::TokenAcquired | PushState::Registered | PushState::Listening
        )
    }
}

impl From<&PushMachineState> for PushState {
    fn from(state: &PushMachineState) -> Self {
        match state {
            PushMachineState::Uninitialized => PushState::Uninitialized,
            PushMachineState::PermissionRequested => PushState::PermissionRequested,
            PushMachineState::Granted => PushState::Granted,
            PushMachineState::Denied => PushState::Denied,
            PushMachineState::Unsupported => PushState::Unsupported,
            PushMachineState::TokenAcquired => PushState::TokenAcquired,
            PushMachineState::Registered => PushState::Registered,
            PushMachineState::Listening => PushState::Listening,
            PushMachineState::Degraded => PushState::Degraded,
        }
    }
}
