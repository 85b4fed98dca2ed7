//! Options command - actor and task pickers.

use anyhow::Result;
use clap::{Args, ValueEnum};
use console::Style;

use super::Context;
use crate::client::connect;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    Actors,
    Tasks,
}

/// Arguments for the options command.
#[derive(Args, Debug)]
pub struct OptionsArgs {
    /// What to list
    #[arg(value_enum)]
    pub kind: OptionKind,
}

/// Run the options command.
pub async fn run(args: OptionsArgs, ctx: &Context) -> Result<()> {
    let actions = connect(ctx)?;
    let entries = match args.kind {
        OptionKind::Actors => actions.actor_options().await?,
        OptionKind::Tasks => actions.task_options().await?,
    };

    if ctx.json_output {
        println!("{}", serde_json::to_string(&entries)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    for entry in &entries {
        println!("{:<20} {}", dim.apply_to(&entry.id), entry.name);
    }
    if entries.is_empty() {
        println!("{}", dim.apply_to("Nothing found"));
    }
    Ok(())
}
