//! Single-file upload coordination.

use crate::accepted::UploadPolicy;
use crate::error::{RegistryError, UploadError, UploadResult};
use crate::registry::DataSourceRegistry;
use api_client::UploadReceipt;
use client_config_and_utils::ReconcileSettings;
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Where the coordinator is in its single upload slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadPhase {
    Idle,
    Validating,
    Submitting,
    Done,
}

/// Result of an accepted upload.
#[derive(Debug)]
pub struct UploadOutcome {
    /// Row count reported by the server.
    pub rows: u64,
    pub receipt: UploadReceipt,
    /// Set when the follow-up listing fetch failed. The upload itself
    /// succeeded and the registry still shows its previous list.
    pub refresh_error: Option<RegistryError>,
    /// True when pending sources are being polled in the background, by a
    /// new run or one that was already active.
    pub reconciling: bool,
}

/// Resets the phase to `Idle` on every exit path.
struct PhaseGuard<'a> {
    phase: &'a Mutex<UploadPhase>,
}

impl PhaseGuard<'_> {
    fn set(&self, next: UploadPhase) {
        *self.phase.lock() = next;
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        *self.phase.lock() = UploadPhase::Idle;
    }
}

/// Validates and submits one file at a time.
///
/// A file of the wrong kind is always rejected with a validation error. An
/// acceptable submission made while another is active fails with
/// [`UploadError::Busy`] and sends nothing. After a successful upload the
/// registry is refreshed exactly once; sources still pending are then handed
/// to the registry's reconciler. The registry is never patched from the upload
/// response.
pub struct UploadCoordinator {
    registry: Arc<DataSourceRegistry>,
    policy: UploadPolicy,
    reconcile: ReconcileSettings,
    phase: Mutex<UploadPhase>,
    cancel: CancellationToken,
}

impl UploadCoordinator {
    pub fn new(registry: Arc<DataSourceRegistry>, reconcile: ReconcileSettings) -> Self {
        Self::with_policy(registry, reconcile, UploadPolicy::default())
    }

    pub fn with_policy(
        registry: Arc<DataSourceRegistry>,
        reconcile: ReconcileSettings,
        policy: UploadPolicy,
    ) -> Self {
        // Closing the registry also cancels uploads.
        let cancel = registry.cancel_token().child_token();
        Self {
            registry,
            policy,
            reconcile,
            phase: Mutex::new(UploadPhase::Idle),
            cancel,
        }
    }

    pub fn phase(&self) -> UploadPhase {
        *self.phase.lock()
    }

    pub fn is_busy(&self) -> bool {
        self.phase() != UploadPhase::Idle
    }

    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    pub fn registry(&self) -> &Arc<DataSourceRegistry> {
        &self.registry
    }

    fn claim(&self) -> UploadResult<PhaseGuard<'_>> {
        let mut phase = self.phase.lock();
        if *phase != UploadPhase::Idle {
            debug!(phase = ?*phase, "Rejecting upload while another is active");
            return Err(UploadError::Busy);
        }
        *phase = UploadPhase::Validating;
        Ok(PhaseGuard { phase: &self.phase })
    }

    /// Submit `content` as `filename`.
    pub async fn submit(&self, filename: &str, content: Vec<u8>) -> UploadResult<UploadOutcome> {
        // A rejected file gets the validation message even while busy.
        if let Err(e) = self.policy.validate(filename) {
            debug!(filename = %filename, "Upload rejected by local validation");
            return Err(e);
        }
        let guard = self.claim()?;
        if self.cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }

        guard.set(UploadPhase::Submitting);
        let api = self.registry.client();
        let receipt = tokio::select! {
            _ = self.cancel.cancelled() => {
                info!(filename = %filename, "Upload cancelled");
                return Err(UploadError::Cancelled);
            }
            result = api.upload(filename, content) => result,
        };
        let receipt = match receipt {
            Ok(receipt) => receipt,
            Err(e) => {
                warn!(filename = %filename, error = %e, "Upload failed");
                return Err(e.into());
            }
        };

        guard.set(UploadPhase::Done);
        info!(filename = %filename, rows = receipt.rows, "Upload processed");
        drop(guard);

        if self.cancel.is_cancelled() {
            return Err(UploadError::Cancelled);
        }

        let refresh_error = match self.registry.refresh().await {
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "Refresh after upload failed");
                Some(e)
            }
        };
        let reconciling = refresh_error.is_none() && self.registry.reconcile_pending(&self.reconcile);

        Ok(UploadOutcome {
            rows: receipt.rows,
            receipt,
            refresh_error,
            reconciling,
        })
    }

    /// Read `path` and submit it under its file name.
    pub async fn submit_path(&self, path: &Path) -> UploadResult<UploadOutcome> {
        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| UploadError::Validation("Invalid file name".to_string()))?;

        // Checked again inside `submit`; avoids reading a file we would reject.
        self.policy.validate(filename)?;

        let content = tokio::fs::read(path).await.map_err(|source| UploadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.submit(filename, content).await
    }

    /// Cancel an in-flight upload. Its response, if it still arrives, is
    /// not applied and no refresh is made.
    pub fn close(&self) {
        self.cancel.cancel();
    }
}
