//! Configuration system for runbridge.
//!
//! Provides TOML-based configuration with:
//! - `[api]` connection settings (base URL, console URL, token, timeout)
//! - `[retry]` backoff budget for transient failures
//! - `[enrichment]` output key, dataset item cap and extra record keys
//! - Config file layering (user config dir + project-local overrides)
//! - Token resolution (env var → config file)

pub mod discovery;
pub mod error;
pub mod secrets;
pub mod types;

pub use discovery::{
    LoadedConfig, PROJECT_CONFIG_FILE, load_config, load_config_file, load_config_with_options, save_config,
    user_config_dir, user_config_path,
};
pub use error::{ConfigError, Result};
pub use secrets::{ResolvedSecret, SecretSource, TOKEN_ENV_VAR, resolve_token};
pub use types::*;
