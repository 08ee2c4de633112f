//! Client-side mirror of the source listing.

use crate::error::{RegistryError, RegistryResult};
use crate::reconcile::ReconcileSlot;
use api_client::{ApiClient, DataSource, SourceStatus};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// The list of data sources as last fetched from the server.
///
/// `refresh` replaces the whole list with the server's answer, in the
/// server's order. A failed refresh leaves the previous list in place.
/// Overlapping refreshes are ordered by when they were issued: a response to
/// an older request never replaces a list from a newer one.
/// Closing the registry cancels in-flight fetches and the reconciler, and no
/// response that arrives afterwards is applied.
pub struct DataSourceRegistry {
    api: ApiClient,
    sources: watch::Sender<Vec<DataSource>>,
    /// Sequence number of the last refresh issued.
    issued: AtomicU64,
    /// Sequence number of the refresh whose listing is shown.
    applied: Mutex<u64>,
    cancel: CancellationToken,
    pub(crate) reconciler: Mutex<ReconcileSlot>,
}

impl DataSourceRegistry {
    pub fn new(api: ApiClient) -> Self {
        let (sources, _) = watch::channel(Vec::new());
        Self {
            api,
            sources,
            issued: AtomicU64::new(0),
            applied: Mutex::new(0),
            cancel: CancellationToken::new(),
            reconciler: Mutex::new(ReconcileSlot::default()),
        }
    }

    pub fn client(&self) -> &ApiClient {
        &self.api
    }

    /// Current sources, in server order.
    pub fn list(&self) -> Vec<DataSource> {
        self.sources.borrow().clone()
    }

    /// Receive every list that replaces the current one.
    pub fn subscribe(&self) -> watch::Receiver<Vec<DataSource>> {
        self.sources.subscribe()
    }

    /// Ids of sources whose status is not terminal yet.
    pub fn pending_ids(&self) -> Vec<String> {
        self.sources
            .borrow()
            .iter()
            .filter(|s| !s.status.is_terminal())
            .map(|s| s.id.clone())
            .collect()
    }

    pub fn has_pending(&self) -> bool {
        self.sources.borrow().iter().any(|s| !s.status.is_terminal())
    }

    /// Replace the list with a fresh fetch of `GET /api/data/sources`.
    ///
    /// Returns the list the registry holds afterwards. When a refresh issued
    /// later has already been applied, this response is discarded and that
    /// newer list is returned instead.
    pub async fn refresh(&self) -> RegistryResult<Vec<DataSource>> {
        if self.cancel.is_cancelled() {
            return Err(RegistryError::Cancelled);
        }
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;

        let fetched = tokio::select! {
            _ = self.cancel.cancelled() => {
                debug!("Source refresh cancelled");
                return Err(RegistryError::Cancelled);
            }
            result = self.api.list_sources() => result,
        };

        let fresh = match fetched {
            Ok(fresh) => fresh,
            Err(e) => {
                warn!(error = %e, "Source refresh failed, keeping last known list");
                return Err(e.into());
            }
        };

        // The registry may have been closed while the body was in flight.
        if self.cancel.is_cancelled() {
            return Err(RegistryError::Cancelled);
        }

        let mut applied = self.applied.lock();
        if sequence < *applied {
            debug!(sequence, applied = *applied, "Discarding out-of-order source listing");
            return Ok(self.list());
        }
        *applied = sequence;
        self.sources.send_modify(|current| {
            log_regressions(current, &fresh);
            *current = fresh.clone();
        });
        debug!(sequence, count = fresh.len(), "Source list replaced");
        Ok(fresh)
    }

    pub(crate) fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Stop all background work. Later refreshes fail with
    /// [`RegistryError::Cancelled`].
    pub fn close(&self) {
        if !self.cancel.is_cancelled() {
            debug!("Closing source registry");
            self.cancel.cancel();
        }
    }

    pub fn is_closed(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Statuses only move forward; a terminal source reported as pending again
/// is mirrored as-is but logged.
fn log_regressions(previous: &[DataSource], fresh: &[DataSource]) {
    let known: HashMap<&str, SourceStatus> =
        previous.iter().map(|s| (s.id.as_str(), s.status)).collect();

    for source in fresh {
        if let Some(old) = known.get(source.id.as_str()) {
            if old.is_terminal() && *old != source.status {
                warn!(
                    source_id = %source.id,
                    old_status = %old,
                    new_status = %source.status,
                    "Server reported a status regression"
                );
            }
        }
    }
}
