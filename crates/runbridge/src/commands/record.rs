//! Record command - key-value store records.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};

use super::{Context, print_empty, print_result, read_input};
use crate::client::connect;

/// Arguments for the record command.
#[derive(Args, Debug)]
pub struct RecordArgs {
    #[command(subcommand)]
    pub command: RecordCommand,
}

#[derive(Subcommand, Debug)]
pub enum RecordCommand {
    /// Read a record
    Get {
        /// Store ID or name
        store: String,
        /// Record key
        key: String,
    },

    /// Write a record, creating the store by name if needed
    Set {
        /// Store ID or name
        store: String,
        /// Record key
        key: String,
        /// Record value (read from --file or stdin when omitted)
        value: Option<String>,
        /// Read the value from a file
        #[arg(long, conflicts_with = "value")]
        file: Option<PathBuf>,
        /// Content type of the value (default: application/json)
        #[arg(long)]
        content_type: Option<String>,
    },
}

/// Run the record command.
pub async fn run(args: RecordArgs, ctx: &Context) -> Result<()> {
    let actions = connect(ctx)?;
    match args.command {
        RecordCommand::Get { store, key } => match actions.get_record(&store, &key).await? {
            Some(record) => print_result(ctx, &format!("{} / {}", store, key), &record),
            None => {
                print_empty(ctx, &format!("Record '{}' not found in '{}'", key, store));
                Ok(())
            }
        },
        RecordCommand::Set {
            store,
            key,
            value,
            file,
            content_type,
        } => {
            let value = match value {
                Some(value) => value,
                None => read_input(file.as_ref())?,
            };
            let result = actions
                .set_record(&store, &key, &value, content_type.as_deref())
                .await?;
            print_result(ctx, &format!("✓ Wrote {}", key), &result)
        }
    }
}
