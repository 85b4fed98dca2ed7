//! Poll command - recently finished runs.

use anyhow::Result;
use clap::Args;

use super::{Context, SourceArgs, print_empty, print_result};
use crate::client::connect;

/// Arguments for the poll command.
#[derive(Args, Debug)]
pub struct PollArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Recent runs to look at
    #[arg(short, long, default_value = "10")]
    pub limit: usize,
}

/// Run the poll command.
pub async fn run(args: PollArgs, ctx: &Context) -> Result<()> {
    let actions = connect(ctx)?;
    let runs = actions
        .poll_finished_runs(&args.source.source(), args.limit)
        .await?;

    if runs.is_empty() {
        print_empty(ctx, "No finished runs");
        return Ok(());
    }
    print_result(ctx, &format!("{} finished run(s)", runs.len()), &runs)
}
