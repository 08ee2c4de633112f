//! The authentication gate.
//!
//! The gate tracks the session status in an explicit FSM while the credential
//! itself lives in the shared [`TokenStore`]. Only the gate writes the
//! credential: on login/registration success, on logout and when startup
//! verification fails.

use crate::gate_fsm::{AuthGateChangedPayload, AuthGateState, GateMachine, GateMachineInput};
use crate::routing::{decide, Route, RouteDecision};
use crate::{AuthError, AuthResult};
use api_client::{ApiClient, TokenResponse, User};
use parking_lot::Mutex;
use session_store::TokenStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Callback type for gate state change notifications.
pub type AuthStateCallback = Box<dyn Fn(AuthGateChangedPayload) + Send + Sync>;

type SharedCallback = Arc<dyn Fn(AuthGateChangedPayload) + Send + Sync>;

pub struct AuthGate {
    api: ApiClient,
    fsm: Mutex<GateMachine>,
    /// Identity from the last successful verification or login.
    user: Mutex<Option<User>>,
    state_callback: Mutex<Option<SharedCallback>>,
}

impl AuthGate {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            fsm: Mutex::new(GateMachine::new()),
            user: Mutex::new(None),
            state_callback: Mutex::new(None),
        }
    }

    /// Set a callback to be notified of state changes. The callback runs with
    /// no gate lock held and may call back into the gate.
    pub fn set_state_callback(&self, callback: AuthStateCallback) {
        *self.state_callback.lock() = Some(Arc::from(callback));
    }

    pub fn state(&self) -> AuthGateState {
        AuthGateState::from(self.fsm.lock().state())
    }

    /// The signed-in user, if known.
    pub fn user(&self) -> Option<User> {
        self.user.lock().clone()
    }

    /// The client every gated view should use.
    pub fn client(&self) -> &ApiClient {
        &self.api
    }

    fn tokens(&self) -> &Arc<TokenStore> {
        self.api.tokens()
    }

    /// Routing decision for `route` in the current state.
    pub fn route(&self, route: Route) -> RouteDecision {
        decide(self.state(), route)
    }

    /// Transition the FSM and notify the callback if the state changed.
    fn transition(&self, input: &GateMachineInput) -> AuthResult<AuthGateState> {
        let mut fsm = self.fsm.lock();
        let old_state = AuthGateState::from(fsm.state());

        fsm.consume(input).map_err(|_| {
            AuthError::InvalidStateTransition(format!(
                "Cannot apply {:?} in state {:?}",
                input,
                fsm.state()
            ))
        })?;

        let new_state = AuthGateState::from(fsm.state());
        drop(fsm);

        if old_state != new_state {
            debug!(
                old_state = ?old_state,
                new_state = ?new_state,
                "Auth gate transition"
            );
            self.notify_state_change(new_state);
        }

        Ok(new_state)
    }

    fn notify_state_change(&self, state: AuthGateState) {
        let Some(callback) = self.state_callback.lock().clone() else {
            return;
        };
        let payload = AuthGateChangedPayload::new(state, self.user.lock().as_ref());
        callback(payload);
    }

    /// Validate the stored credential. Runs once; later calls return the
    /// current state without touching the network.
    ///
    /// - No credential: `Unknown -> Unauthenticated`, no request is made.
    /// - Credential present: `Unknown -> Checking`, then `GET /api/auth/me`.
    ///   Success leads to `Authenticated`. Any failure clears the credential
    ///   and leads to `Unauthenticated`.
    ///
    /// Verification failures are not errors: they resolve to
    /// `Ok(Unauthenticated)`.
    pub async fn initialize(&self) -> AuthResult<AuthGateState> {
        let current = self.state();
        if current != AuthGateState::Unknown {
            debug!(state = ?current, "Auth gate already initialized");
            return Ok(current);
        }

        let has_credential = match self.tokens().has_credential() {
            Ok(found) => found,
            Err(e) => {
                warn!(error = %e, "Could not read stored credential, treating as absent");
                if let Err(e) = self.tokens().clear() {
                    warn!(error = %e, "Failed to clear unreadable credential");
                }
                false
            }
        };

        if !has_credential {
            info!("No stored credential on startup");
            return self.transition(&GateMachineInput::NoCredential);
        }

        self.transition(&GateMachineInput::CredentialFound)?;

        let verification = self.api.me().await;
        self.settle_verification(verification)
    }

    fn settle_verification(
        &self,
        verification: Result<User, api_client::ApiError>,
    ) -> AuthResult<AuthGateState> {
        // A login or logout may have settled the gate while the check was in
        // flight; its outcome wins and the stale result is dropped.
        let current = self.state();
        if current != AuthGateState::Checking {
            debug!(state = ?current, "Discarding stale verification result");
            return Ok(current);
        }

        match verification {
            Ok(user) => {
                info!(user_id = %user.id, email = %user.email, "Stored credential verified");
                *self.user.lock() = Some(user);
                self.transition(&GateMachineInput::Verified)
            }
            Err(e) => {
                warn!(error = %e, "Credential verification failed, clearing session");
                if let Err(e) = self.tokens().clear() {
                    warn!(error = %e, "Failed to clear rejected credential");
                }
                *self.user.lock() = None;
                self.transition(&GateMachineInput::Rejected)
            }
        }
    }

    /// Log in with email and password.
    ///
    /// On success the credential is stored and the gate becomes
    /// `Authenticated`. On failure nothing changes.
    pub async fn login(&self, email: &str, password: &str) -> AuthResult<Option<User>> {
        let email = email.trim();
        require("Email", email)?;
        require("Password", password)?;

        let response = self.api.login(email, password).await?;
        self.accept_session(response)
    }

    /// Create an account and sign in to it.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        company_name: &str,
    ) -> AuthResult<Option<User>> {
        let email = email.trim();
        let company_name = company_name.trim();
        require("Email", email)?;
        require("Password", password)?;
        require("Company name", company_name)?;

        let response = self.api.register(email, password, company_name).await?;
        self.accept_session(response)
    }

    fn accept_session(&self, response: TokenResponse) -> AuthResult<Option<User>> {
        self.tokens().set(&response.token)?;
        *self.user.lock() = response.user.clone();

        match &response.user {
            Some(user) => info!(user_id = %user.id, email = %user.email, "Signed in"),
            None => info!("Signed in"),
        }

        self.transition(&GateMachineInput::LoginSucceeded)?;
        Ok(response.user)
    }

    /// Clear the credential and move to `Unauthenticated`.
    ///
    /// The state changes even if clearing storage fails; the storage error is
    /// still returned.
    pub fn logout(&self) -> AuthResult<()> {
        let cleared = self.tokens().clear();
        *self.user.lock() = None;
        self.transition(&GateMachineInput::LoggedOut)?;
        info!("Logged out");
        cleared.map_err(AuthError::from)
    }
}

fn require(field: &str, value: &str) -> AuthResult<()> {
    if value.is_empty() {
        return Err(AuthError::Validation(format!("{field} is required")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use url::Url;

    fn offline_gate() -> AuthGate {
        // Nothing listens on port 9; tests below never reach the network.
        let api = ApiClient::new(
            Url::parse("http://127.0.0.1:9").unwrap(),
            Arc::new(TokenStore::in_memory()),
            Duration::from_millis(200),
        )
        .unwrap();
        AuthGate::new(api)
    }

    #[test]
    fn test_require_rejects_empty() {
        assert!(require("Email", "").is_err());
        assert!(require("Email", "a@b.com").is_ok());
    }

    #[tokio::test]
    async fn test_login_validation_sends_nothing() {
        let gate = offline_gate();

        let err = gate.login("  ", "secret").await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(err.user_message("x"), "Email is required");

        let err = gate.register("a@b.com", "secret", "").await.unwrap_err();
        assert_eq!(err.user_message("x"), "Company name is required");

        assert_eq!(gate.state(), AuthGateState::Unknown);
    }

    #[test]
    fn test_logout_before_initialize() {
        let gate = offline_gate();
        gate.tokens().set("abc123").unwrap();

        gate.logout().unwrap();

        assert_eq!(gate.state(), AuthGateState::Unauthenticated);
        assert!(!gate.tokens().has_credential().unwrap());
    }

    #[test]
    fn test_callback_may_replace_itself() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let gate = Arc::new(offline_gate());
        let later = Arc::new(AtomicUsize::new(0));

        let weak = Arc::downgrade(&gate);
        let counter = later.clone();
        gate.set_state_callback(Box::new(move |_| {
            if let Some(gate) = weak.upgrade() {
                let counter = counter.clone();
                gate.set_state_callback(Box::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                }));
            }
        }));

        gate.logout().unwrap();
        assert_eq!(later.load(Ordering::SeqCst), 0);

        gate.transition(&GateMachineInput::LoginSucceeded).unwrap();
        assert_eq!(later.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stale_verification_is_discarded() {
        let gate = offline_gate();
        gate.tokens().set("new-login").unwrap();
        gate.transition(&GateMachineInput::LoginSucceeded).unwrap();

        let state = gate
            .settle_verification(Err(api_client::ApiError::Timeout))
            .unwrap();

        assert_eq!(state, AuthGateState::Authenticated);
        assert_eq!(gate.tokens().get().unwrap(), Some("new-login".to_string()));
    }
}
