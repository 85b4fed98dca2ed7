//! API token resolution.
//!
//! Resolution order:
//! 1. Explicit value (CLI flag)
//! 2. `RUNBRIDGE_TOKEN` environment variable
//! 3. Config file (with warning at load time)

/// Environment variable holding the API token.
pub const TOKEN_ENV_VAR: &str = "RUNBRIDGE_TOKEN";

/// Result of token resolution with provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The secret value.
    pub value: String,
    /// Where the secret was found.
    pub source: SecretSource,
}

/// Where a secret was resolved from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSource {
    /// Passed explicitly (command line).
    Explicit,
    /// Environment variable.
    EnvVar(String),
    /// Config file (plaintext, not recommended).
    ConfigFile,
}

impl std::fmt::Display for SecretSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SecretSource::Explicit => write!(f, "command line"),
            SecretSource::EnvVar(var) => write!(f, "env var {}", var),
            SecretSource::ConfigFile => write!(f, "config file (plaintext)"),
        }
    }
}

/// Resolve the API token using the full resolution chain.
pub fn resolve_token(explicit: Option<&str>, config_value: Option<&str>) -> Option<ResolvedSecret> {
    resolve_with_env(explicit, std::env::var(TOKEN_ENV_VAR).ok(), config_value)
}

fn resolve_with_env(
    explicit: Option<&str>,
    env_value: Option<String>,
    config_value: Option<&str>,
) -> Option<ResolvedSecret> {
    if let Some(value) = non_empty(explicit) {
        return Some(ResolvedSecret {
            value: value.to_string(),
            source: SecretSource::Explicit,
        });
    }

    if let Some(value) = env_value.filter(|v| !v.trim().is_empty()) {
        return Some(ResolvedSecret {
            value,
            source: SecretSource::EnvVar(TOKEN_ENV_VAR.to_string()),
        });
    }

    non_empty(config_value).map(|v| ResolvedSecret {
        value: v.to_string(),
        source: SecretSource::ConfigFile,
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}
