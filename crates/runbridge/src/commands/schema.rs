//! Schema command - output field inference, offline.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use console::Style;

use runbridge_domain::infer_fields;

use super::{Context, read_json};

/// Arguments for the schema command.
#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Sample JSON file (stdin when omitted)
    #[arg(long)]
    pub file: Option<PathBuf>,
}

/// Run the schema command.
pub async fn run(args: SchemaArgs, ctx: &Context) -> Result<()> {
    let sample = read_json(args.file.as_ref())?;
    let fields = infer_fields(&sample);

    if ctx.json_output {
        println!("{}", serde_json::to_string(&fields)?);
        return Ok(());
    }

    let dim = Style::new().dim();
    for field in &fields {
        let kind = match (&field.field_type, field.list) {
            (Some(t), true) => format!("{} list", t),
            (Some(t), false) => t.to_string(),
            (None, true) => "list".to_string(),
            (None, false) => String::new(),
        };
        println!("{:<40} {}", field.key, dim.apply_to(kind));
    }
    Ok(())
}
