//! Decisiv CLI - sign in, upload data sources and read analytics.

mod commands;
mod output;

use clap::{Parser, Subcommand};
use client_config_and_utils::{Config, Paths};
use std::path::PathBuf;
use tracing::debug;

/// Decisiv CLI - Command-line client for the Decisiv analytics service.
#[derive(Parser)]
#[command(name = "decisiv")]
#[command(about = "Decisiv CLI for authentication, data uploads and analytics")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format (text or json)
    #[arg(short, long, default_value = "text", global = true)]
    format: output::OutputFormat,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DECISIV_LOG_LEVEL", global = true)]
    log_level: Option<String>,

    /// Base URL of the analytics service
    #[arg(long, env = "DECISIV_API_URL", global = true)]
    api_url: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Login with email and password
    Login {
        /// Account email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
    },

    /// Create an account and sign in
    Register {
        /// Account email (prompted when omitted)
        #[arg(short, long)]
        email: Option<String>,
        /// Company name (prompted when omitted)
        #[arg(short, long)]
        company: Option<String>,
    },

    /// Logout and clear session
    Logout,

    /// Check authentication status
    Status,

    /// Manage data sources
    Sources {
        #[command(subcommand)]
        command: SourceCommands,
    },

    /// Upload a CSV file
    Upload {
        /// Path to the file
        path: PathBuf,
        /// Return as soon as the upload is accepted
        #[arg(long)]
        no_wait: bool,
    },

    /// Show the analytics overview
    Overview {
        /// List every metric instead of the summary
        #[arg(long)]
        metrics: bool,
    },

    /// Show dashboard chart series
    Charts,

    /// Show revenue forecasts
    Predict {
        /// Request a new forecast instead of listing stored ones
        #[arg(long)]
        run: bool,
    },

    /// Manage decision reports
    Reports {
        #[command(subcommand)]
        command: ReportCommands,
    },
}

#[derive(Subcommand)]
enum ReportCommands {
    /// List generated reports
    List,
    /// Show a report
    Show {
        /// Report ID
        id: String,
    },
    /// Generate a report from the current metrics
    Generate,
}

#[derive(Subcommand)]
enum SourceCommands {
    /// List data sources
    List {
        /// Keep polling until pending sources finish processing
        #[arg(short, long)]
        watch: bool,
    },
}

fn load_config(cli: &Cli) -> anyhow::Result<(Config, Paths)> {
    let paths = Paths::new()?;
    paths.ensure_dirs()?;

    let mut config = Config::load(&paths)?;
    if let Some(url) = &cli.api_url {
        config.api_url = url.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    config.validate()?;

    Ok((config, paths))
}

async fn run(cli: Cli, config: Config, paths: Paths) -> anyhow::Result<()> {
    let ctx = commands::Context::new(config, paths)?;
    let format = &cli.format;

    match cli.command {
        Commands::Login { email } => commands::login(&ctx, email, format).await,
        Commands::Register { email, company } => {
            commands::register(&ctx, email, company, format).await
        }
        Commands::Logout => commands::logout(&ctx, format).await,
        Commands::Status => commands::status(&ctx, format).await,
        Commands::Sources { command } => match command {
            SourceCommands::List { watch } => commands::sources_list(&ctx, watch, format).await,
        },
        Commands::Upload { path, no_wait } => commands::upload(&ctx, &path, no_wait, format).await,
        Commands::Overview { metrics } => commands::overview(&ctx, metrics, format).await,
        Commands::Charts => commands::charts(&ctx, format).await,
        Commands::Predict { run } => commands::forecast(&ctx, run, format).await,
        Commands::Reports { command } => match command {
            ReportCommands::List => commands::reports_list(&ctx, format).await,
            ReportCommands::Show { id } => commands::report_show(&ctx, &id, format).await,
            ReportCommands::Generate => commands::report_generate(&ctx, format).await,
        },
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let format = cli.format;

    let (config, paths) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            output::print_error(&format!("{:#}", e), &format);
            std::process::exit(1);
        }
    };

    client_config_and_utils::init_logging("cli", &config.log_level, &paths);
    debug!(api_url = %config.api_url, "Configuration loaded");

    if let Err(e) = run(cli, config, paths).await {
        output::print_error(&e.to_string(), &format);
        std::process::exit(1);
    }
}
