//! CLI command implementations.

mod analytics;
mod auth;
mod predict;
mod reports;
mod sources;

pub use analytics::{charts, overview};
pub use auth::{login, logout, register, status};
pub use predict::forecast;
pub use reports::{report_generate, report_show, reports_list};
pub use sources::{sources_list, upload};

use anyhow::{Context as _, Result};
use api_client::{ApiClient, ApiError};
use auth_gate::{AuthGate, Route, RouteDecision};
use client_config_and_utils::{Config, Paths};
use session_store::{FileStorage, TokenStore};
use std::sync::Arc;

/// Shown whenever the server rejects the stored credential on a regular call.
pub const SESSION_EXPIRED: &str = "Your session has expired. Run 'decisiv login' to sign in again.";

/// Everything a command needs: configuration and the auth gate wrapping
/// the credential-aware client.
pub struct Context {
    pub config: Config,
    pub paths: Paths,
    pub gate: AuthGate,
}

impl Context {
    pub fn new(config: Config, paths: Paths) -> Result<Self> {
        let tokens = Arc::new(TokenStore::new(Box::new(FileStorage::new(
            paths.credentials_file(),
        ))));
        let api = ApiClient::new(config.api_url()?, tokens, config.request_timeout())
            .context("Failed to create API client")?;

        Ok(Self {
            config,
            paths,
            gate: AuthGate::new(api),
        })
    }

    pub fn client(&self) -> &ApiClient {
        self.gate.client()
    }

    /// Run startup validation and make sure `route` may be shown.
    pub async fn require_session(&self, route: Route) -> Result<()> {
        self.gate.initialize().await?;
        match self.gate.route(route) {
            RouteDecision::Render => Ok(()),
            RouteDecision::RedirectToLogin => {
                anyhow::bail!("Not logged in. Run 'decisiv login' first.")
            }
            decision => anyhow::bail!("Session is not ready ({:?})", decision),
        }
    }
}

/// Message for a failed service call. A 401 outside startup validation
/// leaves the credential in place and points the user at `login`.
pub(crate) fn api_failure(err: &ApiError, fallback: &str) -> anyhow::Error {
    if err.is_unauthorized() {
        anyhow::anyhow!(SESSION_EXPIRED)
    } else {
        anyhow::anyhow!(err.user_message(fallback))
    }
}
