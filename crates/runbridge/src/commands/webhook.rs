//! Webhook command - run-finished notifications.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{Context, SourceArgs, print_result, read_json};
use crate::client::connect;

/// Arguments for the webhook command.
#[derive(Args, Debug)]
pub struct WebhookArgs {
    #[command(subcommand)]
    pub command: WebhookCommand,
}

#[derive(Subcommand, Debug)]
pub enum WebhookCommand {
    /// Register a callback for finished runs of an actor or task
    Subscribe {
        #[command(flatten)]
        source: SourceArgs,
        /// Callback URL
        #[arg(long)]
        url: String,
    },

    /// Remove a webhook
    Unsubscribe {
        /// Webhook ID
        id: String,
    },

    /// Enrich the run referenced by a delivered payload
    Receive {
        /// Payload file (stdin when omitted)
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

/// Run the webhook command.
pub async fn run(args: WebhookArgs, ctx: &Context) -> Result<()> {
    match args.command {
        WebhookCommand::Subscribe { source, url } => {
            let subscription = connect(ctx)?.subscribe(&source.source(), &url).await?;
            print_result(ctx, &format!("✓ Subscribed {}", subscription.id), &subscription)
        }
        WebhookCommand::Unsubscribe { id } => {
            let result = connect(ctx)?.unsubscribe(&id).await?;
            print_result(ctx, &format!("✓ Removed {}", id), &result)
        }
        WebhookCommand::Receive { file } => {
            let payload = read_json(file.as_ref())?;
            let run = connect(ctx)?.receive_webhook(&payload).await?;
            print_result(ctx, &format!("Run {} ({})", run.run.id, run.run.status), &run)
        }
    }
}
