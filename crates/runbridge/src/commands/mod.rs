//! CLI command handlers.

pub mod auth;
pub mod config;
pub mod items;
pub mod last_run;
pub mod options;
pub mod poll;
pub mod record;
pub mod run;
pub mod schema;
pub mod webhook;

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context as _, Result};
use clap::Args;
use console::{Style, style};
use runbridge_client::RunSource;
use serde::Serialize;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Output as JSON for scripting.
    pub json_output: bool,
    /// Verbose output enabled.
    pub verbose: bool,
    /// API token from the command line.
    pub token: Option<String>,
    /// API base URL from the command line or environment.
    pub base_url: Option<String>,
}

/// Actor or task selector shared by run-related commands.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Actor or task ID (`username/name` is accepted)
    pub id: String,

    /// Treat the ID as a task instead of an actor
    #[arg(long)]
    pub task: bool,
}

impl SourceArgs {
    pub fn source(&self) -> RunSource {
        if self.task {
            RunSource::task(&self.id)
        } else {
            RunSource::actor(&self.id)
        }
    }
}

/// Print a result: bare JSON with `--json`, titled pretty JSON otherwise.
pub fn print_result<T: Serialize>(ctx: &Context, title: &str, value: &T) -> Result<()> {
    if ctx.json_output {
        println!("{}", serde_json::to_string(value)?);
    } else {
        println!("{}", style(title).bold());
        println!("{}", Style::new().dim().apply_to("─".repeat(50)));
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Print an "empty result" note (or `[]` with `--json`).
pub fn print_empty(ctx: &Context, message: &str) {
    if ctx.json_output {
        println!("[]");
    } else {
        println!("{}", Style::new().dim().apply_to(message));
    }
}

/// Read a file, or stdin when no path is given.
pub fn read_input(path: Option<&PathBuf>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

/// Parse JSON read from a file or stdin.
pub fn read_json(path: Option<&PathBuf>) -> Result<serde_json::Value> {
    let text = read_input(path)?;
    serde_json::from_str(&text).context("Input is not valid JSON")
}
