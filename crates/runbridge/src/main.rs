//! runbridge - actor and task runs from the terminal
//!
//! Main entry point for the runbridge CLI.

use anyhow::Result;
use clap::{Parser, Subcommand};

mod client;
mod commands;

use commands::{auth, config, items, last_run, options, poll, record, run, schema, webhook};

// ─────────────────────────────────────────────────────────────────────────────
// CLI Structure
// ─────────────────────────────────────────────────────────────────────────────

/// runbridge - start, search and watch actor and task runs
#[derive(Parser)]
#[command(name = "runbridge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output as JSON (for scripting)
    #[arg(long, global = true)]
    pub json: bool,

    /// API token (default: RUNBRIDGE_TOKEN, then the config file)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// API base URL (default: https://api.apify.com/v2/)
    #[arg(long, global = true, env = "RUNBRIDGE_BASE_URL")]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check the API token
    Auth(auth::AuthArgs),

    /// Start an actor or task run
    Run(run::RunArgs),

    /// Show the most recent run of an actor or task
    LastRun(last_run::LastRunArgs),

    /// List recently finished runs of an actor or task
    Poll(poll::PollArgs),

    /// Fetch dataset items
    Items(items::ItemsArgs),

    /// Read or write key-value store records
    Record(record::RecordArgs),

    /// Manage run-finished webhooks
    Webhook(webhook::WebhookArgs),

    /// List actors or tasks
    Options(options::OptionsArgs),

    /// Infer output fields from a sample JSON value
    Schema(schema::SchemaArgs),

    /// Configuration management
    Config(config::ConfigArgs),
}

// ─────────────────────────────────────────────────────────────────────────────
// Main
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing: console (human-readable, stderr) + rotating JSON file
    let filter = if cli.verbose {
        "runbridge=debug,runbridge_client=debug,runbridge_domain=debug,runbridge_config=debug,info"
    } else {
        "runbridge=info,runbridge_client=warn,runbridge_domain=info,runbridge_config=info,warn"
    };

    let log_dir = runbridge_config::user_config_dir()
        .map(|d| d.join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));
    let file_appender = tracing_appender::rolling::daily(&log_dir, "runbridge.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    use tracing_subscriber::prelude::*;
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_writer(std::io::stderr)
                .with_filter(tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(non_blocking)
                .with_filter(tracing_subscriber::EnvFilter::new(
                    "runbridge=trace,runbridge_client=trace,runbridge_domain=trace,runbridge_config=trace,info",
                )),
        )
        .init();

    // Create context for commands
    let ctx = commands::Context {
        json_output: cli.json,
        verbose: cli.verbose,
        token: cli.token,
        base_url: cli.base_url,
    };

    // Dispatch to command handlers
    match cli.command {
        Commands::Auth(args) => auth::run(args, &ctx).await,
        Commands::Run(args) => run::run(args, &ctx).await,
        Commands::LastRun(args) => last_run::run(args, &ctx).await,
        Commands::Poll(args) => poll::run(args, &ctx).await,
        Commands::Items(args) => items::run(args, &ctx).await,
        Commands::Record(args) => record::run(args, &ctx).await,
        Commands::Webhook(args) => webhook::run(args, &ctx).await,
        Commands::Options(args) => options::run(args, &ctx).await,
        Commands::Schema(args) => schema::run(args, &ctx).await,
        Commands::Config(args) => config::run(args, &ctx).await,
    }
}
