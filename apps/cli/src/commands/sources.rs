//! Data source commands.

use super::{api_failure, Context, SESSION_EXPIRED};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use auth_gate::Route;
use data_sources::{
    DataSourceRegistry, ReconcileEnd, ReconcileReport, RegistryError, UploadCoordinator,
    UploadError,
};
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

fn refresh_failure(err: &RegistryError) -> anyhow::Error {
    match err {
        RegistryError::Api(e) => api_failure(e, "Failed to load data sources"),
        RegistryError::Cancelled => anyhow::anyhow!("Interrupted"),
    }
}

/// Wait for reconciliation to finish, or stop it on Ctrl-C.
async fn wait_for_pending(
    registry: &DataSourceRegistry,
    format: &OutputFormat,
) -> Option<ReconcileReport> {
    if *format == OutputFormat::Text {
        println!("Waiting for processing to finish (Ctrl-C to stop)...");
    }

    tokio::select! {
        report = registry.join_reconciler() => report,
        _ = tokio::signal::ctrl_c() => {
            debug!("Interrupted while waiting for pending sources");
            registry.close();
            output::print_warning("Stopped waiting; sources may still be processing", format);
            None
        }
    }
}

fn describe_report(report: &ReconcileReport, format: &OutputFormat) {
    match report.end {
        ReconcileEnd::Unauthorized => output::print_error(SESSION_EXPIRED, format),
        ReconcileEnd::Cancelled => {
            output::print_warning("Stopped waiting; sources may still be processing", format)
        }
        ReconcileEnd::Drained if !report.exhausted.is_empty() => output::print_warning(
            &format!(
                "{} source(s) still processing. Check again later with 'decisiv sources list'.",
                report.exhausted.len()
            ),
            format,
        ),
        ReconcileEnd::Drained => {}
    }
}

/// List data sources.
pub async fn sources_list(ctx: &Context, watch: bool, format: &OutputFormat) -> Result<()> {
    ctx.require_session(Route::DataSources).await?;

    let registry = Arc::new(DataSourceRegistry::new(ctx.client().clone()));
    registry.refresh().await.map_err(|e| refresh_failure(&e))?;

    if watch && registry.reconcile_pending(&ctx.config.reconcile) {
        if *format == OutputFormat::Text {
            output::print_sources(&registry.list(), format);
        }
        if let Some(report) = wait_for_pending(&registry, format).await {
            describe_report(&report, format);
        }
    }

    output::print_sources(&registry.list(), format);
    Ok(())
}

/// Upload a CSV file.
pub async fn upload(ctx: &Context, path: &Path, no_wait: bool, format: &OutputFormat) -> Result<()> {
    ctx.require_session(Route::DataSources).await?;

    let registry = Arc::new(DataSourceRegistry::new(ctx.client().clone()));
    let coordinator = UploadCoordinator::new(registry.clone(), ctx.config.reconcile.clone());

    if *format == OutputFormat::Text {
        println!("Uploading {}...", path.display());
    }

    let outcome = match coordinator.submit_path(path).await {
        Ok(outcome) => outcome,
        Err(UploadError::Api(e)) if e.is_unauthorized() => anyhow::bail!(SESSION_EXPIRED),
        Err(e) => anyhow::bail!(e.user_message()),
    };

    match format {
        OutputFormat::Text => {
            output::print_success(&format!("Processed {} rows", outcome.rows), format);
            if !outcome.receipt.columns.is_empty() {
                output::print_row("Columns", &outcome.receipt.columns.join(", "));
            }
            if let Some(id) = &outcome.receipt.data_source_id {
                output::print_row("Source ID", id);
            }
        }
        OutputFormat::Json => output::print_json(&outcome.receipt),
    }

    if let Some(err) = &outcome.refresh_error {
        output::print_warning(&refresh_failure(err).to_string(), format);
        return Ok(());
    }

    if outcome.reconciling {
        if no_wait {
            registry.close();
            output::print_warning("Processing continues on the server", format);
        } else if let Some(report) = wait_for_pending(&registry, format).await {
            describe_report(&report, format);
        }
    }

    if *format == OutputFormat::Text {
        output::print_sources(&registry.list(), format);
    }
    Ok(())
}
