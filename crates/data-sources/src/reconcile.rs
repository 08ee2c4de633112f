//! Bounded polling of sources that are still `pending`.
//!
//! Each tick re-fetches the full listing through [`DataSourceRegistry::refresh`]
//! and tracks attempts per pending id. An id leaves the set when it turns
//! terminal, disappears from the listing or uses up its attempt budget. Ids
//! that become pending while a run is active are handed to that run. The
//! task ends when the set is empty, the registry is closed, or the server
//! rejects the credential.

use crate::error::RegistryError;
use crate::registry::DataSourceRegistry;
use client_config_and_utils::ReconcileSettings;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Why a reconciliation run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconcileEnd {
    /// Every tracked id settled, vanished or ran out of attempts.
    #[default]
    Drained,
    /// The registry was closed.
    Cancelled,
    /// The server answered 401.
    Unauthorized,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Ids that reached `completed` or `failed`.
    pub settled: Vec<String>,
    /// Ids no longer present in the listing.
    pub vanished: Vec<String>,
    /// Ids still pending when their budget ran out.
    pub exhausted: Vec<String>,
    /// Listing fetches performed.
    pub fetches: u32,
    pub end: ReconcileEnd,
}

/// The registry's single reconciliation run.
///
/// `active` is cleared by the run itself, under the same lock that
/// `reconcile_pending` takes, so an id handed off is either adopted by the
/// running task or starts a new one.
#[derive(Default)]
pub(crate) struct ReconcileSlot {
    task: Option<JoinHandle<ReconcileReport>>,
    active: bool,
    handoff: Vec<String>,
}

impl DataSourceRegistry {
    /// Make sure every source currently pending is being polled.
    ///
    /// Starts a background run, or hands the pending ids to the run already
    /// active. Returns `false` when nothing is pending or the registry is
    /// closed.
    pub fn reconcile_pending(self: &Arc<Self>, settings: &ReconcileSettings) -> bool {
        if self.is_closed() {
            return false;
        }

        let pending = self.pending_ids();
        if pending.is_empty() {
            return false;
        }

        let mut slot = self.reconciler.lock();
        if slot.active {
            debug!(pending = pending.len(), "Handing pending sources to running reconciliation");
            slot.handoff.extend(pending);
            return true;
        }

        info!(
            pending = pending.len(),
            interval_ms = settings.interval_ms,
            max_attempts = settings.max_attempts,
            "Starting reconciliation of pending sources"
        );
        let registry = Arc::clone(self);
        let settings = settings.clone();
        slot.active = true;
        slot.handoff.clear();
        slot.task = Some(tokio::spawn(run(registry, settings, pending)));
        true
    }

    /// Wait for the current reconciliation run, if any, and return its report.
    pub async fn join_reconciler(&self) -> Option<ReconcileReport> {
        let task = self.reconciler.lock().task.take()?;
        match task.await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!(error = %e, "Reconciliation task failed");
                None
            }
        }
    }

    pub fn is_reconciling(&self) -> bool {
        self.reconciler.lock().active
    }

    /// Move handed-off ids into `attempts`. When nothing is left to track the
    /// run is marked inactive and `false` is returned.
    fn adopt_handoff(
        &self,
        attempts: &mut HashMap<String, u32>,
        retired: &HashSet<String>,
    ) -> bool {
        let mut slot = self.reconciler.lock();
        for id in slot.handoff.drain(..) {
            if !retired.contains(&id) {
                attempts.entry(id).or_insert(0);
            }
        }
        if attempts.is_empty() {
            slot.active = false;
            return false;
        }
        true
    }

    fn deactivate_reconciler(&self) {
        let mut slot = self.reconciler.lock();
        slot.active = false;
        slot.handoff.clear();
    }
}

async fn run(
    registry: Arc<DataSourceRegistry>,
    settings: ReconcileSettings,
    pending: Vec<String>,
) -> ReconcileReport {
    let mut attempts: HashMap<String, u32> = pending.into_iter().map(|id| (id, 0)).collect();
    let mut report = ReconcileReport::default();
    // Ids dropped from tracking are never adopted again, so a source stuck in
    // `pending` cannot keep the task alive.
    let mut retired: HashSet<String> = HashSet::new();
    let cancel = registry.cancel_token().clone();

    while registry.adopt_handoff(&mut attempts, &retired) {
        tokio::select! {
            _ = cancel.cancelled() => {
                report.end = ReconcileEnd::Cancelled;
                break;
            }
            _ = tokio::time::sleep(settings.interval()) => {}
        }

        report.fetches += 1;
        let listing = match registry.refresh().await {
            Ok(listing) => Some(listing),
            Err(RegistryError::Cancelled) => {
                report.end = ReconcileEnd::Cancelled;
                break;
            }
            Err(e) if e.is_unauthorized() => {
                warn!("Credential rejected during reconciliation, stopping");
                report.end = ReconcileEnd::Unauthorized;
                break;
            }
            // A failed fetch still spends an attempt.
            Err(_) => None,
        };

        for count in attempts.values_mut() {
            *count += 1;
        }

        if let Some(listing) = listing {
            let status_of: HashMap<&str, _> =
                listing.iter().map(|s| (s.id.as_str(), s.status)).collect();

            attempts.retain(|id, _| match status_of.get(id.as_str()) {
                None => {
                    debug!(source_id = %id, "Pending source vanished from listing");
                    retired.insert(id.clone());
                    report.vanished.push(id.clone());
                    false
                }
                Some(status) if status.is_terminal() => {
                    info!(source_id = %id, status = %status, "Source settled");
                    retired.insert(id.clone());
                    report.settled.push(id.clone());
                    false
                }
                Some(_) => true,
            });

            for source in &listing {
                if !source.status.is_terminal()
                    && !attempts.contains_key(&source.id)
                    && !retired.contains(&source.id)
                {
                    attempts.insert(source.id.clone(), 0);
                }
            }
        }

        attempts.retain(|id, count| {
            if *count >= settings.max_attempts {
                warn!(source_id = %id, attempts = *count, "Source still pending, giving up");
                retired.insert(id.clone());
                report.exhausted.push(id.clone());
                false
            } else {
                true
            }
        });
    }

    if report.end != ReconcileEnd::Drained {
        registry.deactivate_reconciler();
    }

    // HashMap iteration order is arbitrary.
    report.settled.sort();
    report.vanished.sort();
    report.exhausted.sort();

    debug!(
        fetches = report.fetches,
        end = ?report.end,
        "Reconciliation finished"
    );
    report
}
