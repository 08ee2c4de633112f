//! Decision report commands.

use super::{api_failure, Context};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use api_client::Report;
use auth_gate::Route;

fn print_report(report: &Report) {
    output::print_heading(&report.title);
    output::print_row("ID", &report.id);
    if let Some(created_at) = &report.created_at {
        output::print_row("Created", created_at);
    }
    println!();
    println!("{}", report.content.trim_end());
}

/// List generated reports, newest first.
pub async fn reports_list(ctx: &Context, format: &OutputFormat) -> Result<()> {
    ctx.require_session(Route::Reports).await?;

    let reports = ctx
        .client()
        .list_reports()
        .await
        .map_err(|e| api_failure(&e, "Failed to load reports"))?;

    match format {
        OutputFormat::Text => {
            output::print_heading("Reports");
            if reports.is_empty() {
                println!("  No reports yet. Create one with 'decisiv reports generate'.");
            }
            for report in &reports {
                println!(
                    "  {:<38} {}",
                    report.id,
                    output::truncate(&report.title, 40)
                );
                if !report.summary.is_empty() {
                    println!("    {}", output::truncate(&report.summary, 72));
                }
            }
        }
        OutputFormat::Json => output::print_json(&reports),
    }
    Ok(())
}

/// Show one report in full.
pub async fn report_show(ctx: &Context, id: &str, format: &OutputFormat) -> Result<()> {
    ctx.require_session(Route::Reports).await?;

    let report = ctx
        .client()
        .report(id)
        .await
        .map_err(|e| api_failure(&e, "Failed to load report"))?;

    match format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => output::print_json(&report),
    }
    Ok(())
}

/// Ask the service to draft a new report from the current metrics.
pub async fn report_generate(ctx: &Context, format: &OutputFormat) -> Result<()> {
    ctx.require_session(Route::Reports).await?;

    if *format == OutputFormat::Text {
        println!("Generating report...");
    }
    let report = ctx
        .client()
        .generate_report()
        .await
        .map_err(|e| api_failure(&e, "Failed to generate report"))?;

    match format {
        OutputFormat::Text => print_report(&report),
        OutputFormat::Json => output::print_json(&report),
    }
    Ok(())
}
