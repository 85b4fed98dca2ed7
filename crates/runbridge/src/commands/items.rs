//! Items command - dataset items.

use anyhow::Result;
use clap::Args;

use super::{Context, print_empty, print_result};
use crate::client::connect;

/// Arguments for the items command.
#[derive(Args, Debug)]
pub struct ItemsArgs {
    /// Dataset ID or name
    pub dataset: String,

    /// Maximum items to fetch
    #[arg(short, long, default_value = "100")]
    pub limit: usize,

    /// Items to skip
    #[arg(short, long, default_value = "0")]
    pub offset: usize,
}

/// Run the items command.
pub async fn run(args: ItemsArgs, ctx: &Context) -> Result<()> {
    let actions = connect(ctx)?;
    match actions
        .fetch_dataset_items(&args.dataset, args.limit, args.offset)
        .await?
    {
        Some(page) => {
            let title = match page.total {
                Some(total) => format!("{} of {} item(s)", page.items.len(), total),
                None => format!("{} item(s)", page.items.len()),
            };
            print_result(ctx, &title, &page)
        }
        None => {
            print_empty(ctx, &format!("Dataset '{}' not found", args.dataset));
            Ok(())
        }
    }
}
