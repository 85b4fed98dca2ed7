//! Auth command - token check.

use anyhow::Result;
use clap::Args;
use console::Style;

use super::Context;
use crate::client::connect;

/// Arguments for the auth command.
#[derive(Args, Debug)]
pub struct AuthArgs {}

/// Run the auth command.
pub async fn run(_args: AuthArgs, ctx: &Context) -> Result<()> {
    let user = connect(ctx)?.test_auth().await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string(&user)?);
    } else {
        let green = Style::new().green();
        let dim = Style::new().dim();
        println!(
            "{} Authenticated as {} {}",
            green.apply_to("✓"),
            user.username,
            dim.apply_to(format!("({})", user.id))
        );
    }
    Ok(())
}
