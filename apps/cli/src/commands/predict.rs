//! Forecast commands.

use super::{api_failure, Context};
use crate::output::{self, OutputFormat};
use anyhow::Result;
use api_client::PredictionScenario;
use auth_gate::Route;

fn print_scenario(scenario: &PredictionScenario) {
    output::print_heading(&scenario.metric_name);
    if let Some(created_at) = &scenario.created_at {
        output::print_row("Created", created_at);
    }
    println!(
        "  {:<6} {:>14} {:>14} {:>14}",
        "Step", "Optimistic", "Conservative", "Critical"
    );
    let steps = scenario
        .optimistic
        .len()
        .max(scenario.conservative.len())
        .max(scenario.critical.len());
    for step in 0..steps {
        println!(
            "  {:<6} {:>14} {:>14} {:>14}",
            format!("+{}", step + 1),
            cell(&scenario.optimistic, step),
            cell(&scenario.conservative, step),
            cell(&scenario.critical, step)
        );
    }
}

fn cell(values: &[f64], step: usize) -> String {
    values
        .get(step)
        .map(|v| format!("{v:.2}"))
        .unwrap_or_else(|| "-".to_string())
}

/// List stored forecasts, or request a new one with `run`.
pub async fn forecast(ctx: &Context, run: bool, format: &OutputFormat) -> Result<()> {
    ctx.require_session(Route::Predictive).await?;
    let client = ctx.client();

    let scenarios = if run {
        let scenario = client
            .run_prediction()
            .await
            .map_err(|e| api_failure(&e, "Failed to run forecast"))?;
        vec![scenario]
    } else {
        client
            .prediction_scenarios()
            .await
            .map_err(|e| api_failure(&e, "Failed to load forecasts"))?
    };

    match format {
        OutputFormat::Text => {
            if scenarios.is_empty() {
                println!("No forecasts yet. Run 'decisiv predict --run'.");
            }
            scenarios.iter().for_each(print_scenario);
        }
        OutputFormat::Json => output::print_json(&scenarios),
    }
    Ok(())
}
