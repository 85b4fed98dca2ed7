//! Platform client construction from config files and global flags.

use std::time::Duration;

use anyhow::{Context as _, Result, anyhow};
use runbridge_client::{PlatformClient, RetryPolicy};
use runbridge_config::{LoadedConfig, RunbridgeConfig, resolve_token};
use runbridge_domain::{Actions, DomainConfig, DomainServices};
use tracing::{debug, warn};

use crate::commands::Context;

/// Load the layered config and log its warnings.
pub fn load_config() -> Result<LoadedConfig> {
    let loaded = runbridge_config::load_config(None).context("Failed to load configuration")?;
    for warning in &loaded.warnings {
        warn!("{}", warning);
    }
    Ok(loaded)
}

/// Build a client from the config, with flags taking precedence.
pub fn build_client(config: &RunbridgeConfig, ctx: &Context) -> Result<PlatformClient> {
    let api = config.api();
    let retry = config.retry();

    let token = resolve_token(ctx.token.as_deref(), api.token.as_deref()).ok_or_else(|| {
        anyhow!("No API token. Set RUNBRIDGE_TOKEN, pass --token, or add token to [api] in the config file")
    })?;
    debug!(source = %token.source, "Resolved API token");

    let base_url = ctx.base_url.clone().unwrap_or(api.base_url);
    let client = PlatformClient::builder()
        .base_url(base_url)
        .console_url(api.console_url)
        .token(token.value)
        .timeout(Duration::from_secs(api.timeout_secs))
        .retry_policy(RetryPolicy {
            max_retries: retry.max_retries,
            initial_backoff: Duration::from_millis(retry.initial_backoff_ms),
        })
        .build()?;
    Ok(client)
}

/// Everything a platform-facing command needs.
pub fn connect(ctx: &Context) -> Result<Actions> {
    let loaded = load_config()?;
    let client = build_client(&loaded.config, ctx)?;
    let domain = DomainConfig::from(&loaded.config.enrichment());
    Ok(Actions::new(DomainServices::new(client, domain)))
}
