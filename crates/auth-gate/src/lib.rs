//! Authentication gate for the Decisiv client.
//!
//! This crate provides:
//! - An explicit FSM (`gate_machine`) for the session status
//! - [`AuthGate`], which validates the stored credential once at startup and
//!   owns every write to it afterwards (login, registration, logout)
//! - [`decide`], the routing decision derived from the gate state

mod error;
mod gate;
mod gate_fsm;
mod routing;

pub use error::{AuthError, AuthResult};
pub use gate::{AuthGate, AuthStateCallback};
pub use gate_fsm::gate_machine;
pub use gate_fsm::{
    AuthGateChangedPayload, AuthGateState, GateMachine, GateMachineInput, GateMachineState,
};
pub use routing::{decide, Route, RouteDecision};
