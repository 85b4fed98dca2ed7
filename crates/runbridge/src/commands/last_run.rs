//! Last-run command - most recent run of an actor or task.

use anyhow::Result;
use clap::Args;

use runbridge_client::RunStatus;

use super::{Context, SourceArgs, print_empty, print_result};
use crate::client::connect;

/// Arguments for the last-run command.
#[derive(Args, Debug)]
pub struct LastRunArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Only consider runs with this status (e.g. SUCCEEDED)
    #[arg(long)]
    pub status: Option<RunStatus>,

    /// Extra key-value store keys to include in the result
    #[arg(short, long = "key")]
    pub keys: Vec<String>,
}

/// Run the last-run command.
pub async fn run(args: LastRunArgs, ctx: &Context) -> Result<()> {
    let actions = connect(ctx)?;
    let runs = actions
        .find_last_run(&args.source.source(), args.status, args.keys)
        .await?;

    match runs.first() {
        Some(run) => print_result(ctx, &format!("Run {} ({})", run.run.id, run.run.status), &runs),
        None => {
            print_empty(ctx, "No matching run found");
            Ok(())
        }
    }
}
