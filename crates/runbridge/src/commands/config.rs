//! Config command - configuration management.

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::{Args, Subcommand};
use console::Style;

use runbridge_config::{PROJECT_CONFIG_FILE, resolve_token};

use super::Context;
use crate::client::load_config;

/// Arguments for the config command.
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show resolved configuration and where it came from
    Show,

    /// Show the user configuration file path
    Path,

    /// Initialize a config file with defaults
    Init {
        /// Create project-local config (./runbridge.toml) instead of user config
        #[arg(long)]
        local: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => cmd_show(ctx),
        ConfigCommand::Path => cmd_path(),
        ConfigCommand::Init { local, force } => cmd_init(local, force),
    }
}

fn cmd_show(ctx: &Context) -> Result<()> {
    let loaded = load_config()?;
    let config = &loaded.config;
    let api = config.api();
    let retry = config.retry();
    let enrichment = config.enrichment();
    let token = resolve_token(ctx.token.as_deref(), api.token.as_deref());

    if ctx.json_output {
        let sources: Vec<String> = loaded
            .loaded_from()
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        let value = serde_json::json!({
            "sources": sources,
            "api": {
                "baseUrl": ctx.base_url.as_deref().unwrap_or(&api.base_url),
                "consoleUrl": api.console_url,
                "timeoutSecs": api.timeout_secs,
                "token": token.as_ref().map(|t| t.source.to_string()),
            },
            "retry": {
                "maxRetries": retry.max_retries,
                "initialBackoffMs": retry.initial_backoff_ms,
            },
            "enrichment": {
                "outputKey": enrichment.output_key,
                "datasetItemLimit": enrichment.dataset_item_limit,
                "extraKeys": enrichment.extra_keys,
            },
            "warnings": loaded.warnings,
        });
        println!("{}", value);
        return Ok(());
    }

    let bold = Style::new().bold();
    let dim = Style::new().dim();

    println!("{}\n", bold.apply_to("# runbridge configuration"));

    let sources = loaded.loaded_from();
    if sources.is_empty() {
        println!("No config files loaded (using defaults)\n");
    } else {
        println!("Config files:");
        for source in &sources {
            println!("  {}", source.display());
        }
        println!();
    }

    println!("API:");
    println!("  base url:    {}", ctx.base_url.as_deref().unwrap_or(&api.base_url));
    println!("  console url: {}", api.console_url);
    println!("  timeout:     {}s", api.timeout_secs);
    match &token {
        Some(token) => println!(
            "  token:       {} {}",
            mask(&token.value),
            dim.apply_to(format!("({})", token.source))
        ),
        None => println!("  token:       {}", dim.apply_to("not set")),
    }
    println!();

    println!("Retry:");
    println!("  max retries: {}", retry.max_retries);
    println!("  backoff:     {}ms (doubling)", retry.initial_backoff_ms);
    println!();

    println!("Enrichment:");
    println!("  output key:  {}", enrichment.output_key);
    println!("  item limit:  {}", enrichment.dataset_item_limit);
    if !enrichment.extra_keys.is_empty() {
        println!("  extra keys:  {}", enrichment.extra_keys.join(", "));
    }
    println!();

    if !loaded.warnings.is_empty() {
        println!("Warnings:");
        for w in &loaded.warnings {
            println!("  ⚠ {}", w);
        }
        println!();
    }

    if ctx.verbose {
        println!("---\nRaw config:\n");
        println!("{}", config.to_toml()?);
    }

    Ok(())
}

fn cmd_path() -> Result<()> {
    let path = runbridge_config::user_config_path()
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;
    println!("{}", path.display());
    Ok(())
}

fn cmd_init(local: bool, force: bool) -> Result<()> {
    let path = if local {
        PathBuf::from(PROJECT_CONFIG_FILE)
    } else {
        let path = runbridge_config::user_config_path()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        path
    };

    if path.exists() && !force {
        println!("Config file already exists: {}", path.display());
        println!("Use --force to overwrite it.");
        return Ok(());
    }

    let template = r#"# runbridge configuration

[api]
base_url = "https://api.apify.com/v2/"
console_url = "https://console.apify.com"
timeout_secs = 30
# Prefer the RUNBRIDGE_TOKEN environment variable over storing it here.
# token = "..."

# Transient failures (5xx, 429) are retried with doubling backoff
[retry]
max_retries = 3
initial_backoff_ms = 200

[enrichment]
output_key = "OUTPUT"
dataset_item_limit = 100
# extra_keys = ["INPUT"]
"#;

    std::fs::write(&path, template)?;
    println!("✓ Created config file: {}", path.display());
    println!();
    println!("Next steps:");
    println!("  export RUNBRIDGE_TOKEN=...     # API token");
    println!("  runbridge config show          # verify configuration");
    println!("  runbridge auth                 # check the token");

    Ok(())
}

/// Keep the first and last four characters of a secret.
fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "****".to_string();
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask("short"), "****");
        assert_eq!(mask("apify_api_abcdefgh1234"), "apif…1234");
    }
}
