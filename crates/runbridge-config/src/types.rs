//! Configuration types mapping to the TOML schema.
//!
//! ```toml
//! [api]
//! base_url = "https://api.apify.com/v2/"
//! console_url = "https://console.apify.com"
//! timeout_secs = 30
//!
//! [retry]
//! max_retries = 3
//! initial_backoff_ms = 200
//!
//! [enrichment]
//! output_key = "OUTPUT"
//! dataset_item_limit = 100
//! extra_keys = ["INPUT"]
//! ```

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.apify.com/v2/";

/// Default web console URL.
pub const DEFAULT_CONSOLE_URL: &str = "https://console.apify.com";

/// Default request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_INITIAL_BACKOFF_MS: u64 = 200;

/// Key-value store key holding a run's main output.
pub const DEFAULT_OUTPUT_KEY: &str = "OUTPUT";

/// Dataset items attached to an enriched run.
pub const DEFAULT_DATASET_ITEM_LIMIT: usize = 100;

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunbridgeConfig {
    /// Remote API connection.
    pub api: Option<ApiConfig>,

    /// Retry budget.
    pub retry: Option<RetryConfig>,

    /// Run enrichment settings.
    pub enrichment: Option<EnrichmentConfig>,
}

impl RunbridgeConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    pub fn merge(&mut self, other: RunbridgeConfig) {
        if other.api.is_some() {
            self.api = other.api;
        }

        if other.retry.is_some() {
            self.retry = other.retry;
        }

        if other.enrichment.is_some() {
            self.enrichment = other.enrichment;
        }
    }

    /// API section, or defaults.
    pub fn api(&self) -> ApiConfig {
        self.api.clone().unwrap_or_default()
    }

    /// Retry section, or defaults.
    pub fn retry(&self) -> RetryConfig {
        self.retry.clone().unwrap_or_default()
    }

    /// Enrichment section, or defaults.
    pub fn enrichment(&self) -> EnrichmentConfig {
        self.enrichment.clone().unwrap_or_default()
    }

    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let api = self.api();
        if api.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "api.timeout_secs".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let retry = self.retry();
        if retry.max_retries > 10 {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_retries".to_string(),
                reason: format!("{} exceeds the maximum of 10", retry.max_retries),
            });
        }

        let enrichment = self.enrichment();
        if enrichment.dataset_item_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "enrichment.dataset_item_limit".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if enrichment.output_key.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "enrichment.output_key".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }

    /// Whether the config file itself holds a token.
    pub fn has_plaintext_token(&self) -> bool {
        self.api.as_ref().is_some_and(|api| api.token.is_some())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Sections
// ─────────────────────────────────────────────────────────────────────────────

/// `[api]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// API base URL.
    pub base_url: String,
    /// Web console URL for details page links.
    pub console_url: String,
    /// API token (prefer the `RUNBRIDGE_TOKEN` env var).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            console_url: DEFAULT_CONSOLE_URL.to_string(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `[retry]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry, doubled after each retry.
    pub initial_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff_ms: DEFAULT_INITIAL_BACKOFF_MS,
        }
    }
}

/// `[enrichment]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    /// Record key always merged into enriched runs.
    pub output_key: String,
    /// Maximum dataset items attached to an enriched run.
    pub dataset_item_limit: usize,
    /// Additional record keys merged into every enriched run.
    pub extra_keys: Vec<String>,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            output_key: DEFAULT_OUTPUT_KEY.to_string(),
            dataset_item_limit: DEFAULT_DATASET_ITEM_LIMIT,
            extra_keys: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = RunbridgeConfig::from_toml("").unwrap();
        assert!(config.api.is_none());
        assert_eq!(config.api().base_url, DEFAULT_BASE_URL);
        assert_eq!(config.retry().max_retries, 3);
        assert_eq!(config.retry().initial_backoff_ms, 200);
        assert_eq!(config.enrichment().output_key, "OUTPUT");
        assert_eq!(config.enrichment().dataset_item_limit, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_config() {
        let config = RunbridgeConfig::from_toml(
            r#"
[api]
base_url = "http://localhost:9000/v2/"
timeout_secs = 10

[retry]
max_retries = 5

[enrichment]
extra_keys = ["INPUT", "SCREENSHOT"]
"#,
        )
        .unwrap();

        let api = config.api();
        assert_eq!(api.base_url, "http://localhost:9000/v2/");
        assert_eq!(api.console_url, DEFAULT_CONSOLE_URL);
        assert_eq!(api.timeout_secs, 10);
        assert_eq!(config.retry().max_retries, 5);
        assert_eq!(config.retry().initial_backoff_ms, 200);
        assert_eq!(config.enrichment().extra_keys, vec!["INPUT", "SCREENSHOT"]);
    }

    #[test]
    fn test_merge_overrides_sections() {
        let mut base = RunbridgeConfig::from_toml("[retry]\nmax_retries = 1\n[api]\ntimeout_secs = 5").unwrap();
        let overlay = RunbridgeConfig::from_toml("[retry]\nmax_retries = 2").unwrap();
        base.merge(overlay);
        assert_eq!(base.retry().max_retries, 2);
        assert_eq!(base.api().timeout_secs, 5);
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let config = RunbridgeConfig::from_toml("[enrichment]\ndataset_item_limit = 0").unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("enrichment.dataset_item_limit"));
    }

    #[test]
    fn test_validate_rejects_huge_retry_budget() {
        let config = RunbridgeConfig::from_toml("[retry]\nmax_retries = 50").unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_roundtrip() {
        let mut config = RunbridgeConfig::new();
        config.enrichment = Some(EnrichmentConfig {
            extra_keys: vec!["INPUT".to_string()],
            ..Default::default()
        });
        let text = config.to_toml().unwrap();
        assert_eq!(RunbridgeConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_plaintext_token_detection() {
        let config = RunbridgeConfig::from_toml("[api]\ntoken = \"abc\"").unwrap();
        assert!(config.has_plaintext_token());
        assert!(!RunbridgeConfig::new().has_plaintext_token());
    }
}
