//! Run command - start an actor or task run.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use runbridge_domain::RunRequest;

use super::{Context, SourceArgs, print_result, read_input};
use crate::client::connect;

/// Arguments for the run command.
#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Run input as a JSON object (overrides the saved input of a task)
    #[arg(long, conflicts_with = "input_file")]
    pub input: Option<String>,

    /// Read the run input from a file
    #[arg(long)]
    pub input_file: Option<PathBuf>,

    /// Build tag or number
    #[arg(long)]
    pub build: Option<String>,

    /// Memory in megabytes (power of two, 128 to 32768)
    #[arg(long)]
    pub memory: Option<u32>,

    /// Run timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Wait up to this many seconds (max 60) for the run to finish
    #[arg(long)]
    pub wait: Option<u64>,

    /// Extra key-value store keys to include in the result
    #[arg(short, long = "key")]
    pub keys: Vec<String>,
}

/// Run the run command.
pub async fn run(args: RunArgs, ctx: &Context) -> Result<()> {
    let input = match &args.input_file {
        Some(path) => Some(read_input(Some(path))?),
        None => args.input,
    };
    let request = RunRequest {
        input,
        build: args.build,
        memory_mbytes: args.memory,
        timeout_secs: args.timeout,
        wait_for_finish_secs: args.wait,
        extra_keys: args.keys,
    };

    let actions = connect(ctx)?;
    let run = actions.run(&args.source.source(), request).await?;
    print_result(ctx, &format!("Run {} ({})", run.run.id, run.run.status), &run)
}
