//! Routing decision derived from the gate state.

use crate::AuthGateState;
use serde::{Deserialize, Serialize};

/// Views of the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    /// Public marketing page
    Landing,
    /// Login / registration form
    Login,
    Dashboard,
    DataSources,
    Analytics,
    /// Forecast scenarios
    Predictive,
    /// Generated decision reports
    Reports,
}

impl Route {
    /// Views that require an authenticated session.
    pub fn is_protected(&self) -> bool {
        !matches!(self, Route::Landing | Route::Login)
    }
}

/// What the routing layer should do for a requested view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteDecision {
    /// Hold a neutral view until the gate settles.
    Loading,
    Render,
    RedirectToLogin,
    RedirectToDashboard,
}

/// Decide how to handle `route` while the gate is in `state`.
///
/// Protected views render only while authenticated. The login view bounces
/// an authenticated user to the dashboard. Nothing redirects while the gate
/// is still `Unknown` or `Checking`.
pub fn decide(state: AuthGateState, route: Route) -> RouteDecision {
    if route == Route::Landing {
        return RouteDecision::Render;
    }
    if !state.is_settled() {
        return RouteDecision::Loading;
    }
    match (route.is_protected(), state.is_authenticated()) {
        (true, true) | (false, false) => RouteDecision::Render,
        (true, false) => RouteDecision::RedirectToLogin,
        (false, true) => RouteDecision::RedirectToDashboard,
    }
}
