//! Analytics commands.

use super::{api_failure, Context};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use api_client::{Chart, Metric};
use auth_gate::Route;

fn format_change(change: f64) -> String {
    format!("{:+.1}%", change)
}

fn print_metrics(metrics: &[Metric]) {
    for metric in metrics {
        println!(
            "  {:<28} {:>14.2}  {}",
            metric.name,
            metric.value,
            format_change(metric.change_percentage)
        );
    }
}

/// Show the analytics overview, or every metric with `all_metrics`.
pub async fn overview(ctx: &Context, all_metrics: bool, format: &OutputFormat) -> Result<()> {
    ctx.require_session(Route::Analytics).await?;
    let client = ctx.client();

    if all_metrics {
        let metrics = client
            .analytics_metrics()
            .await
            .map_err(|e| api_failure(&e, "Failed to load metrics"))?;
        match format {
            OutputFormat::Text => {
                output::print_heading("Metrics");
                print_metrics(&metrics);
            }
            OutputFormat::Json => output::print_json(&metrics),
        }
        return Ok(());
    }

    let overview = client
        .analytics_overview()
        .await
        .map_err(|e| api_failure(&e, "Failed to load analytics"))?;

    match format {
        OutputFormat::Text => {
            output::print_heading("Overview");
            output::print_row("Sources", &overview.total_sources.to_string());
            output::print_row("Metrics", &overview.total_metrics.to_string());
            if !overview.key_metrics.is_empty() {
                output::print_heading("Key metrics");
                print_metrics(&overview.key_metrics);
            }
        }
        OutputFormat::Json => output::print_json(&overview),
    }
    Ok(())
}

fn print_chart(name: &str, chart: &Chart) {
    output::print_heading(&chart_title(name));
    for series in &chart.datasets {
        println!("  {}", series.label);
        for (label, value) in chart.labels.iter().zip(&series.data) {
            println!("    {:<8} {:>14.2}", label, value);
        }
    }
}

/// `revenue_chart` -> `Revenue`.
fn chart_title(name: &str) -> String {
    let base = name.strip_suffix("_chart").unwrap_or(name).replace('_', " ");
    let mut chars = base.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => base,
    }
}

/// Show the chart series served for the dashboard.
pub async fn charts(ctx: &Context, format: &OutputFormat) -> Result<()> {
    ctx.require_session(Route::Analytics).await?;

    let charts = ctx
        .client()
        .analytics_charts()
        .await
        .map_err(|e| api_failure(&e, "Failed to load charts"))?;

    match format {
        OutputFormat::Text => {
            if charts.is_empty() {
                println!("No chart data available.");
            }
            for (name, chart) in &charts {
                print_chart(name, chart);
            }
        }
        OutputFormat::Json => output::print_json(&charts),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_change() {
        assert_eq!(format_change(12.5), "+12.5%");
        assert_eq!(format_change(-3.04), "-3.0%");
        assert_eq!(format_change(0.0), "+0.0%");
    }

    #[test]
    fn test_chart_title() {
        assert_eq!(chart_title("revenue_chart"), "Revenue");
        assert_eq!(chart_title("cash_flow"), "Cash flow");
        assert_eq!(chart_title(""), "");
    }
}
