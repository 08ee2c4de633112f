//! Session status state machine using rust-fsm.
//!
//! ```text
//!            ┌─────────┐
//!            │ Unknown │ (initial)
//!            └────┬────┘
//!   CredentialFound │         NoCredential
//!                 ▼        └──────────────────┐
//!           ┌──────────┐                      │
//!           │ Checking │── Rejected ──────────┤
//!           └────┬─────┘                      ▼
//!       Verified │                   ┌─────────────────┐
//!                ▼     LoggedOut     │ Unauthenticated │
//!      ┌───────────────┐ ──────────► └─────────────────┘
//!      │ Authenticated │ ◄────────── LoginSucceeded
//!      └───────────────┘
//! ```
//!
//! `LoginSucceeded` and `LoggedOut` are accepted from every state, since a
//! login or logout may happen before startup validation has settled.

use api_client::User;
use rust_fsm::*;
use serde::{Deserialize, Serialize};

state_machine! {
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub gate_machine(Unknown)

    Unknown => {
        CredentialFound => Checking,
        NoCredential => Unauthenticated,
        LoginSucceeded => Authenticated,
        LoggedOut => Unauthenticated
    },
    Checking => {
        Verified => Authenticated,
        Rejected => Unauthenticated,
        LoginSucceeded => Authenticated,
        LoggedOut => Unauthenticated
    },
    Authenticated => {
        LoginSucceeded => Authenticated,
        LoggedOut => Unauthenticated
    },
    Unauthenticated => {
        LoginSucceeded => Authenticated,
        LoggedOut => Unauthenticated
    }
}

pub use gate_machine::Input as GateMachineInput;
pub use gate_machine::State as GateMachineState;
pub use gate_machine::StateMachine as GateMachine;

/// Session status as seen by the routing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthGateState {
    /// Startup validation has not run yet.
    Unknown,
    /// A stored credential is being verified with the server.
    Checking,
    Authenticated,
    Unauthenticated,
}

impl AuthGateState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthGateState::Authenticated)
    }

    /// True once the gate has reached `Authenticated` or `Unauthenticated`.
    pub fn is_settled(&self) -> bool {
        matches!(
            self,
            AuthGateState::Authenticated | AuthGateState::Unauthenticated
        )
    }
}

impl From<&GateMachineState> for AuthGateState {
    fn from(state: &GateMachineState) -> Self {
        match state {
            GateMachineState::Unknown => AuthGateState::Unknown,
            GateMachineState::Checking => AuthGateState::Checking,
            GateMachineState::Authenticated => AuthGateState::Authenticated,
            GateMachineState::Unauthenticated => AuthGateState::Unauthenticated,
        }
    }
}

/// Payload for gate state change notifications.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthGateChangedPayload {
    pub state: AuthGateState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl AuthGateChangedPayload {
    pub(crate) fn new(state: AuthGateState, user: Option<&User>) -> Self {
        Self {
            state,
            user_id: user.map(|u| u.id.clone()),
            email: user.map(|u| u.email.clone()),
        }
    }
}
